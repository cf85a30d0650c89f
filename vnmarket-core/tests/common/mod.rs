//! Shared helpers: an in-memory fetcher and a one-shot local HTTP listener.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use vnmarket_core::{DataError, Fetcher};

/// Fetcher that returns a fixed outcome and records the URLs it was asked for.
pub struct StaticFetcher {
    outcome: Result<Vec<u8>, u16>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Self::with_outcome(Ok(body.into()))
    }

    pub fn status(status: u16) -> Self {
        Self::with_outcome(Err(status))
    }

    fn with_outcome(outcome: Result<Vec<u8>, u16>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Fetcher for StaticFetcher {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        match &self.outcome {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(DataError::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
        }
    }
}

/// Serve exactly one HTTP response on an ephemeral loopback port and return
/// the base URL (`http://127.0.0.1:PORT`).
pub fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };

        // Drain the request head before answering.
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let head = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body);
        let _ = stream.flush();
    });

    format!("http://{addr}")
}

pub const PRICE_VOLUME_CSV: &str = "\
TICKER ,Trading Date,Daily Closing Price,Matching Volume,Matching Value \n\
VNM,01/03/2024,\"68,100\",\"2,500,000\",\"170,250,000,000\"\n\
FPT,01/03/2024,\"96,500\",\"1,234,567\",\"119,135,715,500\"\n\
FPT,01/02/2024,\"95,000\",\"1,100,000\",\"104,500,000,000\"\n\
ACB,01/02/2024,\"24,100\",\"5,000,000\",\"120,500,000,000\"\n";
