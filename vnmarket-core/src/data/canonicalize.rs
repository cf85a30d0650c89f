use super::table::{IndexRecord, PriceVolumeRecord};
use std::cmp::Ordering;

/// Canonical ordering and value cleaning shared by both loaders
pub struct Canonicalizer;

impl Canonicalizer {
    /// Sort by date ascending. Stable, so equal dates keep source order.
    pub fn sort_index(records: &mut [IndexRecord]) {
        records.sort_by_key(|r| r.date);
    }

    /// Sort by (ticker, trading date) ascending, missing keys last. Stable.
    pub fn sort_price_volume(records: &mut [PriceVolumeRecord]) {
        records.sort_by(|a, b| {
            missing_last(&a.ticker, &b.ticker)
                .then_with(|| missing_last(&a.trading_date, &b.trading_date))
        });
    }

    /// Remove thousands separators and surrounding whitespace: `" 1,234.5 "` -> `"1234.5"`.
    pub fn strip_grouping(raw: &str) -> String {
        raw.trim().chars().filter(|&c| c != ',').collect()
    }

    /// Parse a locale-formatted number. Empty text is NaN; anything else
    /// that fails to parse after stripping is an error.
    pub fn parse_grouped(raw: &str) -> Result<f64, std::num::ParseFloatError> {
        let cleaned = Self::strip_grouping(raw);
        if cleaned.is_empty() {
            return Ok(f64::NAN);
        }
        cleaned.parse::<f64>()
    }

    /// Like [`parse_grouped`](Self::parse_grouped). A trailing `%` scales the
    /// value to a fraction, matching how a percent-formatted cell is stored.
    pub fn parse_percent(raw: &str) -> Result<f64, std::num::ParseFloatError> {
        let trimmed = raw.trim();
        match trimmed.strip_suffix('%') {
            Some(percent) => Self::parse_grouped(percent).map(|v| v / 100.0),
            None => Self::parse_grouped(trimmed),
        }
    }
}

/// Order `Some` values ascending and put `None` after all of them.
fn missing_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
