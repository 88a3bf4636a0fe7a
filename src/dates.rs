use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::{FinboardError, Result};
use crate::models::{Cell, EnrichedTransaction, Entry, RecordKind};
use crate::settings::{ColumnNames, InvalidDatePolicy};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Abbreviation for a 1-based calendar month.
pub fn month_abbrev(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("???")
}

/// Accepts an abbreviation ("Mar", case-insensitive), a full English name
/// prefix ("March") or a number 1-12.
pub fn parse_month(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let lower = raw.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| lower.starts_with(&m.to_ascii_lowercase()))
        .map(|i| i as u32 + 1)
}

/// Convert an Excel serial day number to a date (1899-12-30 epoch).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = chrono::Duration::try_days(serial.floor() as i64)?;
    base.checked_add_signed(days)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(serial) | Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Resolve the issue date of every enriched transaction and derive year and
/// month. Under `Abort` the first unparseable date fails the whole load;
/// under `Skip` the row is dropped and counted in the second return value.
pub fn derive_dates(
    rows: Vec<EnrichedTransaction>,
    columns: &ColumnNames,
    policy: InvalidDatePolicy,
    sheet_names: (&str, &str),
) -> Result<(Vec<Entry>, usize)> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        let cell = row.record.field(&columns.issue_date);
        let Some(date) = parse_date_cell(cell) else {
            let sheet = match row.record.kind {
                RecordKind::Payment => sheet_names.0,
                RecordKind::Receipt => sheet_names.1,
            };
            match policy {
                InvalidDatePolicy::Abort => {
                    return Err(FinboardError::DateParse {
                        sheet: sheet.to_string(),
                        row: row.record.source_row,
                        value: cell.to_string(),
                    });
                }
                InvalidDatePolicy::Skip => {
                    warn!(sheet, row = row.record.source_row, value = %cell, "skipping row with unparseable issue date");
                    skipped += 1;
                    continue;
                }
            }
        };
        let supplier = row.record.field(&columns.supplier).as_label();
        let category = row.category().map(str::to_string);
        entries.push(Entry {
            kind: row.record.kind,
            date,
            year: date.year(),
            month: date.month(),
            supplier,
            category,
            value: row.record.value,
        });
    }
    Ok((entries, skipped))
}
