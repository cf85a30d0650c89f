//! Fetching, decoding, and normalizing the two market datasets

pub mod canonicalize;
pub mod http;
pub mod index;
pub mod ingest;
pub mod price_volume;
pub mod provider;
pub mod schema;
pub mod table;

pub use canonicalize::Canonicalizer;
pub use http::HttpFetcher;
pub use index::{load_index, normalize_index};
pub use ingest::DataIngestor;
pub use price_volume::{load_price_volume, normalize_price_volume};
pub use provider::{DataError, Fetcher};
pub use schema::{IndexSchema, PriceVolumeSchema, SchemaError};
pub use table::{IndexRecord, IndexTable, PriceVolumeRecord, PriceVolumeTable};
