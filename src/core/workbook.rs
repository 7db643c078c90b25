//! Workbook decoding: one spreadsheet container into positional sheets.

use crate::domain::model::{RawRecord, Sheet, SheetSet};
use crate::domain::ports::{Ingestor, Storage};
use crate::utils::error::{FunnelError, Result};
use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::Value;
use std::io::Cursor;

/// File ingestion path: reads one workbook through the storage port and
/// decodes it into the five positional sheets.
pub struct FileIngestor<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> FileIngestor<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }
}

#[async_trait]
impl<S: Storage> Ingestor for FileIngestor<S> {
    async fn extract(&self) -> Result<SheetSet> {
        tracing::info!(path = %self.path, "reading workbook");
        let bytes = self.storage.read_file(&self.path).await?;
        parse_workbook(&bytes)
    }
}

/// Maximum number of positional sheets consumed from a workbook.
const MAX_SHEETS: usize = 5;

/// Decodes fully materialized workbook bytes into the five positional sheets.
///
/// Sheets are consumed strictly by position, not by name; anything beyond the
/// available count is an empty table. Zero sheets is a hard failure.
pub fn parse_workbook(bytes: &[u8]) -> Result<SheetSet> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    tracing::info!(sheets = ?names, "workbook opened");
    if names.is_empty() {
        return Err(FunnelError::EmptyWorkbook);
    }

    let mut tables: Vec<Sheet> = Vec::with_capacity(MAX_SHEETS);
    for name in names.iter().take(MAX_SHEETS) {
        let range = workbook.worksheet_range(name)?;
        let records = range_to_records(&range);
        tracing::info!(sheet = %name, rows = records.len(), "sheet decoded");
        tables.push(records);
    }

    Ok(SheetSet::from_positional(tables))
}

/// Decodes only the first sheet of a workbook, used to supply the
/// store-visits table alongside API-sourced sheets.
pub fn parse_first_sheet(bytes: &[u8]) -> Result<Sheet> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)?;

    let Some(name) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(&name)?;
    Ok(range_to_records(&range))
}

/// Converts a cell range into records keyed by the header row.
///
/// The first non-empty row is the header; each following row maps header
/// label to cell value, skipping empty cells so tolerant field resolution
/// sees them as absent. Column order is preserved in the record.
fn range_to_records(range: &Range<Data>) -> Vec<RawRecord> {
    let mut rows = range.rows();

    let headers: Vec<String> = loop {
        match rows.next() {
            None => return Vec::new(),
            Some(row) if row.iter().any(|c| !matches!(c, Data::Empty)) => {
                break row.iter().map(header_label).collect();
            }
            Some(_) => continue,
        }
    };

    let mut records = Vec::new();
    for row in rows {
        let mut record = RawRecord::default();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            if let Some(value) = cell_to_value(cell) {
                record.data.insert(header.clone(), value);
            }
        }
        if !record.data.is_empty() {
            records.push(record);
        }
    }
    records
}

fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Maps a cell to a JSON scalar. Date-time cells keep their raw serial
/// number so the date parser can apply its serial-vs-duration threshold.
fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64()).map(Value::Number),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(_) => None,
    }
}
