//! Blocking HTTP fetcher.
//!
//! One GET per call, body read to the end before returning. A non-success
//! status is an error; there is no retry.

use super::provider::{DataError, Fetcher};
use crate::config::HttpConfig;
use tracing::debug;

/// HTTP-backed [`Fetcher`].
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DataError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, DataError> {
        let unreachable = |e: reqwest::Error| DataError::NetworkUnreachable {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let resp = self.client.get(url).send().map_err(unreachable)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().map_err(unreachable)?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}
