//! Record types and the immutable tables the loaders return.
//!
//! A table's vector position is its dense zero-based row index: loaders sort
//! before constructing the table, and nothing mutates it afterwards.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One day's VN-Index observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub date: NaiveDate,
    pub closing_value: f64,
    /// Fraction as stored by the sheet: a cell displayed as `-0.35%` is
    /// `-0.0035`. Empty cells are carried as NaN.
    pub percent_change: f64,
}

/// One ticker's trading day.
///
/// A blank ticker or trading date cell is kept as `None`; such rows sort
/// after every row that has the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVolumeRecord {
    pub ticker: Option<String>,
    pub trading_date: Option<NaiveDate>,
    pub closing_price: f64,
    pub matching_volume: f64,
    pub matching_value: f64,
}

/// Index series sorted ascending by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexTable {
    records: Vec<IndexRecord>,
}

impl IndexTable {
    pub(crate) fn from_sorted(records: Vec<IndexRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    pub fn get(&self, row: usize) -> Option<&IndexRecord> {
        self.records.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<IndexRecord> {
        self.records
    }

    /// Render as a frame matching [`IndexSchema`](super::schema::IndexSchema).
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<NaiveDate> = self.records.iter().map(|r| r.date).collect();
        let closes: Vec<f64> = self.records.iter().map(|r| r.closing_value).collect();
        let changes: Vec<f64> = self.records.iter().map(|r| r.percent_change).collect();

        df!(
            "date" => dates,
            "closing_value" => closes,
            "percent_change" => changes,
        )
    }

    /// BLAKE3 over the serialized records.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.records)
    }
}

impl<'a> IntoIterator for &'a IndexTable {
    type Item = &'a IndexRecord;
    type IntoIter = std::slice::Iter<'a, IndexRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Price/volume rows sorted ascending by (ticker, trading date).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceVolumeTable {
    records: Vec<PriceVolumeRecord>,
}

impl PriceVolumeTable {
    pub(crate) fn from_sorted(records: Vec<PriceVolumeRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PriceVolumeRecord] {
        &self.records
    }

    pub fn get(&self, row: usize) -> Option<&PriceVolumeRecord> {
        self.records.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceVolumeRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<PriceVolumeRecord> {
        self.records
    }

    /// Rows for one ticker, in date order.
    pub fn ticker(&self, ticker: &str) -> &[PriceVolumeRecord] {
        // Rows without a ticker sit at the end, past every named ticker.
        let start = self
            .records
            .partition_point(|r| r.ticker.as_deref().is_some_and(|t| t < ticker));
        let end = self
            .records
            .partition_point(|r| r.ticker.as_deref().is_some_and(|t| t <= ticker));
        &self.records[start..end]
    }

    /// Render as a frame matching [`PriceVolumeSchema`](super::schema::PriceVolumeSchema).
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let tickers: Vec<Option<&str>> =
            self.records.iter().map(|r| r.ticker.as_deref()).collect();
        let dates: Vec<Option<NaiveDate>> = self.records.iter().map(|r| r.trading_date).collect();
        let closes: Vec<f64> = self.records.iter().map(|r| r.closing_price).collect();
        let volumes: Vec<f64> = self.records.iter().map(|r| r.matching_volume).collect();
        let values: Vec<f64> = self.records.iter().map(|r| r.matching_value).collect();

        df!(
            "ticker" => tickers,
            "trading_date" => dates,
            "closing_price" => closes,
            "matching_volume" => volumes,
            "matching_value" => values,
        )
    }

    /// BLAKE3 over the serialized records.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.records)
    }
}

impl<'a> IntoIterator for &'a PriceVolumeTable {
    type Item = &'a PriceVolumeRecord;
    type IntoIter = std::slice::Iter<'a, PriceVolumeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn fingerprint<T: Serialize>(records: &[T]) -> String {
    let mut hasher = blake3::Hasher::new();
    for record in records {
        // NaN serializes as null, so hashing never fails on float records.
        let bytes = serde_json::to_vec(record).unwrap_or_default();
        hasher.update(&bytes);
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}
