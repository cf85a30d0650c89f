//! VN-Index loader.
//!
//! Fetches the exported spreadsheet, locates the three named columns on the
//! fixed header row, and turns the data rows below it into [`IndexRecord`]s.
//!
//! Rows whose date cell is empty or holds the footer sentinel are always
//! dropped. Rows whose date cannot be coerced are dropped under
//! [`ParsePolicy::Lenient`] and abort the load under [`ParsePolicy::Strict`].

use super::canonicalize::Canonicalizer;
use super::ingest::DataIngestor;
use super::provider::{DataError, Fetcher};
use super::table::{IndexRecord, IndexTable};
use crate::config::{IndexSourceConfig, ParsePolicy, SheetLayout};
use calamine::{Data, DataType, Range};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

/// Text date formats accepted in addition to native date cells.
const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const TEXT_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Fetch, parse, and normalize the index spreadsheet.
pub fn load_index(
    fetcher: &dyn Fetcher,
    config: &IndexSourceConfig,
) -> Result<IndexTable, DataError> {
    let url = config.url();
    debug!(fetcher = fetcher.name(), %url, "loading index sheet");

    let body = fetcher.fetch(&url)?;
    let range = DataIngestor::read_first_sheet(body)?;
    let table = normalize_index(&range, &config.layout, config.policy)?;

    info!(rows = table.len(), "index table ready");
    Ok(table)
}

/// Project, filter, coerce, and sort a worksheet range.
///
/// Row numbers in errors are absolute, zero-based worksheet rows.
pub fn normalize_index(
    range: &Range<Data>,
    layout: &SheetLayout,
    policy: ParsePolicy,
) -> Result<IndexTable, DataError> {
    let (Some((_, first_col)), Some((last_row, last_col))) = (range.start(), range.end()) else {
        return Err(DataError::Format("worksheet is empty".into()));
    };

    let header = |name: &str| -> Result<u32, DataError> {
        (first_col..=last_col)
            .find(|&col| {
                range
                    .get_value((layout.header_row, col))
                    .is_some_and(|cell| cell_text(cell).trim() == name)
            })
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
            })
    };
    let date_col = header(layout.date_column.as_str())?;
    let close_col = header(layout.close_column.as_str())?;
    let change_col = header(layout.change_column.as_str())?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in layout.first_data_row()..=last_row {
        let date_cell = range.get_value((row, date_col)).unwrap_or(&Data::Empty);
        if is_absent(date_cell) || is_sentinel(date_cell, &layout.footer_sentinel) {
            debug!(row, "skipping row without a date");
            continue;
        }

        let date = match coerce_date(date_cell) {
            Some(date) => date,
            None if policy.drops_on_failure() => {
                debug!(row, value = %date_cell, "dropping row with unparseable date");
                dropped += 1;
                continue;
            }
            None => {
                return Err(DataError::parse(
                    &layout.date_column,
                    row as usize,
                    cell_text(date_cell),
                    "not a calendar date",
                ));
            }
        };

        let closing_value = coerce_number(range, row, close_col, &layout.close_column, policy)?;
        let percent_change = coerce_number(range, row, change_col, &layout.change_column, policy)?;

        records.push(IndexRecord {
            date,
            closing_value,
            percent_change,
        });
    }

    if dropped > 0 {
        warn!(dropped, "dropped index rows with unparseable dates");
    }

    Canonicalizer::sort_index(&mut records);
    Ok(IndexTable::from_sorted(records))
}

fn is_absent(cell: &Data) -> bool {
    matches!(cell, Data::Empty)
}

fn is_sentinel(cell: &Data, sentinel: &str) -> bool {
    matches!(cell, Data::String(s) if s == sentinel)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a date cell. Native dates, ISO strings and Excel serials go
/// through calamine; free text is tried against the accepted formats.
fn coerce_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::String(s) => parse_text_date(s.trim()),
        Data::Bool(_) | Data::Error(_) | Data::Empty | Data::DurationIso(_) => None,
        other => other.as_date(),
    }
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn coerce_number(
    range: &Range<Data>,
    row: u32,
    col: u32,
    column: &str,
    policy: ParsePolicy,
) -> Result<f64, DataError> {
    let cell = range.get_value((row, col)).unwrap_or(&Data::Empty);
    let parsed = match cell {
        Data::Float(f) => Ok(*f),
        Data::Int(i) => Ok(*i as f64),
        Data::Empty => Ok(f64::NAN),
        Data::String(s) => Canonicalizer::parse_percent(s).map_err(|e| e.to_string()),
        other => Err(format!("unexpected cell {other:?}")),
    };

    match parsed {
        Ok(value) => Ok(value),
        Err(_) if policy.drops_on_failure() => {
            debug!(row, column, value = %cell, "non-numeric cell read as NaN");
            Ok(f64::NAN)
        }
        Err(reason) => Err(DataError::parse(column, row as usize, cell_text(cell), reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAST_COL: u32 = 3;

    /// Build a sheet with the default layout: title rows, header on row 12,
    /// two filler rows, then data from row 15. Column 0 is a row label.
    fn sheet(rows: &[(Data, Data, Data)]) -> Range<Data> {
        let layout = SheetLayout::default();
        let last_row = layout.first_data_row() + rows.len().max(1) as u32 - 1;
        let mut range = Range::new((0, 0), (last_row, LAST_COL));

        range.set_value((0, 0), Data::String("VN-Index history".into()));
        range.set_value((layout.header_row, 0), Data::String("STT".into()));
        range.set_value((layout.header_row, 1), Data::String(layout.date_column.clone()));
        range.set_value((layout.header_row, 2), Data::String(layout.close_column.clone()));
        range.set_value((layout.header_row, 3), Data::String(layout.change_column.clone()));
        range.set_value((layout.header_row + 1, 1), Data::String("(dd/mm/yyyy)".into()));
        range.set_value((layout.header_row + 2, 2), Data::String("điểm".into()));

        for (i, (date, close, change)) in rows.iter().enumerate() {
            let row = layout.first_data_row() + i as u32;
            range.set_value((row, 0), Data::Int(i as i64 + 1));
            range.set_value((row, 1), date.clone());
            range.set_value((row, 2), close.clone());
            range.set_value((row, 3), change.clone());
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_normalize_sorts_by_date() {
        let range = sheet(&[
            (text("2024-01-04"), Data::Float(1160.0), Data::Float(0.3)),
            (text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4)),
            (text("2024-01-03"), Data::Float(1155.8), Data::Float(0.5)),
        ]);

        let table =
            normalize_index(&range, &SheetLayout::default(), ParsePolicy::Lenient).unwrap();

        let dates: Vec<NaiveDate> = table.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(table.get(0).unwrap().closing_value, 1150.2);
    }

    #[test]
    fn test_normalize_skips_filler_rows_after_header() {
        // The filler rows hold text that is not a date; they must never surface
        // as dropped or failed rows, even in strict mode.
        let range = sheet(&[(text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4))]);

        let table = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap();

        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_normalize_drops_contact_footer() {
        let range = sheet(&[
            (text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4)),
            (text("Contact"), text("support@example.com"), Data::Empty),
        ]);

        let table = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().date, d(2024, 1, 2));
    }

    #[test]
    fn test_normalize_drops_empty_date_cells() {
        let range = sheet(&[
            (Data::Empty, Data::Float(1.0), Data::Float(1.0)),
            (text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4)),
        ]);

        let table = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap();

        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lenient_drops_unparseable_date() {
        let range = sheet(&[
            (text(""), Data::Float(1.0), Data::Float(1.0)),
            (text("not a date"), Data::Float(2.0), Data::Float(2.0)),
            (text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4)),
        ]);

        let table =
            normalize_index(&range, &SheetLayout::default(), ParsePolicy::Lenient).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().closing_value, 1150.2);
    }

    #[test]
    fn test_strict_fails_on_unparseable_date() {
        let range = sheet(&[
            (text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4)),
            (text(""), Data::Float(1.0), Data::Float(1.0)),
        ]);

        let err =
            normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap_err();

        match err {
            DataError::Parse { column, row, .. } => {
                assert_eq!(column, "Ngày");
                assert_eq!(row, 16);
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_excel_serial_dates_are_accepted() {
        // 45293 is 2024-01-02 in the 1900 date system.
        let range = sheet(&[(Data::Float(45293.0), Data::Float(1150.2), Data::Float(0.4))]);

        let table = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap();

        assert_eq!(table.get(0).unwrap().date, d(2024, 1, 2));
    }

    #[test]
    fn test_text_numbers_are_cleaned() {
        let range = sheet(&[(text("01/02/2024"), text("1,150.20"), text("-0.35%"))]);

        let table = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap();

        let record = table.get(0).unwrap();
        assert_eq!(record.date, d(2024, 1, 2));
        assert_eq!(record.closing_value, 1150.2);
        assert!((record.percent_change - -0.0035).abs() < 1e-12, "got {}", record.percent_change);
    }

    #[test]
    fn test_percent_text_and_percent_cell_agree() {
        let range = sheet(&[
            (text("2024-01-02"), Data::Float(1150.2), text("0.40%")),
            (text("2024-01-03"), Data::Float(1155.8), Data::Float(0.004)),
        ]);

        let table = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap();

        let changes: Vec<f64> = table.iter().map(|r| r.percent_change).collect();
        assert!((changes[0] - changes[1]).abs() < 1e-12, "got {changes:?}");
    }

    #[test]
    fn test_header_row_past_u32_range_is_missing_column() {
        let layout = SheetLayout {
            header_row: u32::MAX,
            ..SheetLayout::default()
        };
        let range = sheet(&[(text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4))]);

        let err = normalize_index(&range, &layout, ParsePolicy::Lenient).unwrap_err();

        assert!(matches!(err, DataError::MissingColumn { .. }), "got {err:?}");
    }

    #[test]
    fn test_empty_numeric_cell_is_nan() {
        let range = sheet(&[(text("2024-01-02"), Data::Float(1150.2), Data::Empty)]);

        let table = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict).unwrap();

        assert!(table.get(0).unwrap().percent_change.is_nan());
    }

    #[test]
    fn test_non_numeric_close_depends_on_policy() {
        let range = sheet(&[(text("2024-01-02"), text("n/a"), Data::Float(0.4))]);

        let lenient =
            normalize_index(&range, &SheetLayout::default(), ParsePolicy::Lenient).unwrap();
        assert!(lenient.get(0).unwrap().closing_value.is_nan());

        let strict = normalize_index(&range, &SheetLayout::default(), ParsePolicy::Strict);
        assert!(strict.unwrap_err().is_parse());
    }

    #[test]
    fn test_missing_header_is_reported() {
        let mut layout = SheetLayout::default();
        layout.close_column = "Close".into();
        let range = sheet(&[(text("2024-01-02"), Data::Float(1150.2), Data::Float(0.4))]);

        let err = normalize_index(&range, &layout, ParsePolicy::Lenient).unwrap_err();

        assert!(matches!(err, DataError::MissingColumn { column } if column == "Close"));
    }

    #[test]
    fn test_empty_sheet_is_format_error() {
        let range: Range<Data> = Range::empty();
        let err =
            normalize_index(&range, &SheetLayout::default(), ParsePolicy::Lenient).unwrap_err();
        assert!(matches!(err, DataError::Format(_)));
    }
}
