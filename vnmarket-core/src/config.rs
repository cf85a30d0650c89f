//! Serializable source configuration.
//!
//! Every remote identifier lives here as a named constant, and every field of
//! [`SourceConfig`] defaults to those constants. A TOML document only needs to
//! name what it overrides, which is how tests point the loaders at a local
//! endpoint.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Document id of the hosted VN-Index spreadsheet.
pub const INDEX_SHEET_ID: &str = "111j7cIaLE8CrIzy1af-YbTT8ezfrxjzv";

/// Spreadsheet export endpoint; `{id}` is replaced by the document id.
pub const SHEET_EXPORT_URL_TEMPLATE: &str =
    "https://docs.google.com/spreadsheets/d/{id}/export?format=xlsx";

/// File id of the hosted price/volume CSV.
pub const PRICE_VOLUME_FILE_ID: &str = "15y35qOprQHFP3Q6xXAHLm0APlOcts1tf";

/// Direct-download endpoint; `{id}` is replaced by the file id.
pub const DRIVE_DOWNLOAD_URL_TEMPLATE: &str =
    "https://drive.google.com/uc?export=download&id={id}";

const ID_PLACEHOLDER: &str = "{id}";

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// What to do with an index row whose date cannot be coerced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Drop the row and keep going.
    #[default]
    Lenient,
    /// Abort the whole load with a parse error.
    Strict,
}

impl ParsePolicy {
    pub fn drops_on_failure(self) -> bool {
        self == ParsePolicy::Lenient
    }
}

/// Top-level configuration for both loaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub index: IndexSourceConfig,
    pub price_volume: PriceVolumeSourceConfig,
    pub http: HttpConfig,
}

impl SourceConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Where the index spreadsheet lives and how it is laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSourceConfig {
    pub url_template: String,
    pub document_id: String,
    pub layout: SheetLayout,
    pub policy: ParsePolicy,
}

impl IndexSourceConfig {
    pub fn url(&self) -> String {
        self.url_template.replace(ID_PLACEHOLDER, &self.document_id)
    }
}

impl Default for IndexSourceConfig {
    fn default() -> Self {
        Self {
            url_template: SHEET_EXPORT_URL_TEMPLATE.to_string(),
            document_id: INDEX_SHEET_ID.to_string(),
            layout: SheetLayout::default(),
            policy: ParsePolicy::default(),
        }
    }
}

/// Fixed layout of the exported index worksheet.
///
/// Rows are absolute and zero-based: the default header sits on spreadsheet
/// row 13, followed by two non-data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub header_row: u32,
    pub skip_after_header: u32,
    pub date_column: String,
    pub close_column: String,
    pub change_column: String,
    pub footer_sentinel: String,
}

impl SheetLayout {
    /// First absolute row holding data. Saturates instead of overflowing, so an
    /// out-of-range layout reads no rows rather than panicking.
    pub fn first_data_row(&self) -> u32 {
        self.header_row
            .saturating_add(1)
            .saturating_add(self.skip_after_header)
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 12,
            skip_after_header: 2,
            date_column: "Ngày".to_string(),
            close_column: "Giá đóng cửa".to_string(),
            change_column: "% Thay đổi".to_string(),
            footer_sentinel: "Contact".to_string(),
        }
    }
}

/// Where the price/volume CSV lives and which columns it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceVolumeSourceConfig {
    pub url_template: String,
    pub file_id: String,
    pub ticker_column: String,
    pub date_column: String,
    pub date_format: String,
    pub close_column: String,
    pub volume_column: String,
    pub value_column: String,
}

impl PriceVolumeSourceConfig {
    pub fn url(&self) -> String {
        self.url_template.replace(ID_PLACEHOLDER, &self.file_id)
    }
}

impl Default for PriceVolumeSourceConfig {
    fn default() -> Self {
        Self {
            url_template: DRIVE_DOWNLOAD_URL_TEMPLATE.to_string(),
            file_id: PRICE_VOLUME_FILE_ID.to_string(),
            ticker_column: "TICKER".to_string(),
            date_column: "Trading Date".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            close_column: "Daily Closing Price".to_string(),
            volume_column: "Matching Volume".to_string(),
            value_column: "Matching Value".to_string(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("vnmarket/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 60,
        }
    }
}
