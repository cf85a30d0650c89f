//! vnmarket core — loaders for the VN-Index series and the per-ticker
//! price/volume table.
//!
//! Each loader is a blocking pipeline: fetch the remote file, decode it,
//! then select, coerce, filter, and sort into an immutable table. The two
//! pipelines share nothing.
//!
//! ```no_run
//! let index = vnmarket_core::load_index_data()?;
//! let prices = vnmarket_core::load_price_volume_data()?;
//! println!("{} index rows, {} price rows", index.len(), prices.len());
//! # Ok::<(), vnmarket_core::DataError>(())
//! ```

pub mod config;
pub mod data;

pub use config::{ParsePolicy, SourceConfig};
pub use data::{
    DataError, Fetcher, HttpFetcher, IndexRecord, IndexTable, PriceVolumeRecord,
    PriceVolumeTable,
};

/// Load the index series from the default source over HTTP.
pub fn load_index_data() -> Result<IndexTable, DataError> {
    let config = SourceConfig::default();
    let fetcher = HttpFetcher::new(&config.http)?;
    data::load_index(&fetcher, &config.index)
}

/// Load the price/volume table from the default source over HTTP.
pub fn load_price_volume_data() -> Result<PriceVolumeTable, DataError> {
    let config = SourceConfig::default();
    let fetcher = HttpFetcher::new(&config.http)?;
    data::load_price_volume(&fetcher, &config.price_volume)
}
