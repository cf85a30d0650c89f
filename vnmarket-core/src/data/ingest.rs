use super::provider::DataError;
use calamine::{Data, Range, Reader, Xlsx};
use polars::prelude::*;
use std::io::Cursor;

/// Decodes fetched bodies into tabular form, without interpreting values
pub struct DataIngestor;

impl DataIngestor {
    /// Read a CSV body with a header row. Every column is read as text so
    /// that value coercion stays with the normalizer.
    pub fn read_csv(body: Vec<u8>) -> Result<DataFrame, DataError> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(body))
            .finish()
            .map_err(|e| DataError::Format(format!("undecodable CSV: {e}")))
    }

    /// Read the first worksheet of an xlsx workbook.
    pub fn read_first_sheet(body: Vec<u8>) -> Result<Range<Data>, DataError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(body))
            .map_err(|e| DataError::Format(format!("undecodable workbook: {e}")))?;

        workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DataError::Format("workbook has no worksheets".into()))?
            .map_err(|e| DataError::Format(format!("unreadable worksheet: {e}")))
    }

    /// Find a column by name, ignoring whitespace around the header text.
    pub fn find_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DataError> {
        df.get_columns()
            .iter()
            .find(|column| column.name().trim() == name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Header names with surrounding whitespace removed.
    pub fn trimmed_column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect()
    }
}
