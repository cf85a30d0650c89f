//! Per-ticker price/volume loader.
//!
//! Fetches the CSV export, looks columns up by whitespace-trimmed header
//! name, and coerces every row. A non-blank value that fails coercion fails
//! the whole load; there is no row filtering on this path. Blank tickers and
//! trading dates are kept as `None` and sort last.

use super::canonicalize::Canonicalizer;
use super::ingest::DataIngestor;
use super::provider::{DataError, Fetcher};
use super::table::{PriceVolumeRecord, PriceVolumeTable};
use crate::config::PriceVolumeSourceConfig;
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Fetch, parse, and normalize the price/volume CSV.
pub fn load_price_volume(
    fetcher: &dyn Fetcher,
    config: &PriceVolumeSourceConfig,
) -> Result<PriceVolumeTable, DataError> {
    let url = config.url();
    debug!(fetcher = fetcher.name(), %url, "loading price/volume csv");

    let body = fetcher.fetch(&url)?;
    let df = DataIngestor::read_csv(body)?;
    let table = normalize_price_volume(&df, config)?;

    info!(rows = table.len(), "price/volume table ready");
    Ok(table)
}

/// Coerce and sort a text-typed frame.
///
/// Row numbers in errors are zero-based data rows (the header is not counted).
pub fn normalize_price_volume(
    df: &DataFrame,
    config: &PriceVolumeSourceConfig,
) -> Result<PriceVolumeTable, DataError> {
    debug!(columns = ?DataIngestor::trimmed_column_names(df), "csv header");

    let tickers = text_column(df, &config.ticker_column)?;
    let dates = text_column(df, &config.date_column)?;
    let closes = text_column(df, &config.close_column)?;
    let volumes = text_column(df, &config.volume_column)?;
    let values = text_column(df, &config.value_column)?;

    let mut records = Vec::with_capacity(df.height());
    let mut missing_keys = 0usize;
    for row in 0..df.height() {
        let ticker = non_blank(tickers.get(row)).map(str::to_string);

        let trading_date = match non_blank(dates.get(row)) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, &config.date_format)
                    .map_err(|e| DataError::parse(&config.date_column, row, raw, e))?,
            ),
            None => None,
        };

        if ticker.is_none() || trading_date.is_none() {
            debug!(row, "row kept without ticker or trading date");
            missing_keys += 1;
        }

        records.push(PriceVolumeRecord {
            ticker,
            trading_date,
            closing_price: grouped_number(closes, row, &config.close_column)?,
            matching_volume: grouped_number(volumes, row, &config.volume_column)?,
            matching_value: grouped_number(values, row, &config.value_column)?,
        });
    }

    if missing_keys > 0 {
        warn!(missing_keys, "price/volume rows without ticker or trading date sort last");
    }

    Canonicalizer::sort_price_volume(&mut records);
    Ok(PriceVolumeTable::from_sorted(records))
}

/// Trimmed text, or `None` for a null or blank cell.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, DataError> {
    DataIngestor::find_column(df, name)?
        .str()
        .map_err(|e| DataError::Format(format!("column '{name}' is not text: {e}")))
}

fn grouped_number(values: &StringChunked, row: usize, column: &str) -> Result<f64, DataError> {
    let raw = values.get(row).unwrap_or_default();
    Canonicalizer::parse_grouped(raw).map_err(|e| DataError::parse(column, row, raw, e))
}
