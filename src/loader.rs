use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{FinboardError, Result};
use crate::models::{Cell, Sheet};
use crate::settings::Settings;

/// The three raw sheets the dashboard is built from.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub accounts: Sheet,
    pub payments: Sheet,
    pub receipts: Sheet,
}

enum Source {
    /// One `<sheet name>.csv` per sheet.
    CsvDir(PathBuf),
    #[cfg(feature = "xlsx")]
    Spreadsheet(calamine::Sheets<std::io::BufReader<std::fs::File>>),
}

impl Source {
    fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FinboardError::DataLoad(format!(
                "workbook not found: {}",
                path.display()
            )));
        }
        if path.is_dir() {
            return Ok(Source::CsvDir(path.to_path_buf()));
        }
        open_spreadsheet(path)
    }

    fn sheet(&mut self, name: &str) -> Result<Sheet> {
        match self {
            Source::CsvDir(dir) => read_csv_sheet(&dir.join(format!("{name}.csv")), name),
            #[cfg(feature = "xlsx")]
            Source::Spreadsheet(book) => read_spreadsheet_sheet(book, name),
        }
    }
}

#[cfg(feature = "xlsx")]
fn open_spreadsheet(path: &Path) -> Result<Source> {
    let book = calamine::open_workbook_auto(path).map_err(|e| {
        FinboardError::DataLoad(format!("failed to open {}: {e}", path.display()))
    })?;
    Ok(Source::Spreadsheet(book))
}

#[cfg(not(feature = "xlsx"))]
fn open_spreadsheet(path: &Path) -> Result<Source> {
    Err(FinboardError::DataLoad(format!(
        "{} is not a directory and spreadsheet support is disabled (build with --features xlsx)",
        path.display()
    )))
}

/// Read the chart of accounts, payments and receipts sheets named in
/// `settings`, failing with `DataLoad` on a missing file, sheet or column.
///
/// Join-key columns are not checked here; the merger reports those.
pub fn load_workbook(path: &Path, settings: &Settings) -> Result<Workbook> {
    let mut source = Source::open(path)?;
    let names = &settings.sheets;
    let cols = &settings.columns;

    let accounts = source.sheet(&names.accounts)?;
    let payments = source.sheet(&names.payments)?;
    let receipts = source.sheet(&names.receipts)?;

    let mut trimmed = accounts.clone();
    trimmed.trim_headers();
    trimmed.require_columns(&[cols.account_category.as_str()])?;
    payments.require_columns(&[
        cols.supplier.as_str(),
        cols.issue_date.as_str(),
        cols.paid_amount.as_str(),
    ])?;
    receipts.require_columns(&[
        cols.supplier.as_str(),
        cols.issue_date.as_str(),
        cols.received_amount.as_str(),
    ])?;

    info!(
        accounts = accounts.rows.len(),
        payments = payments.rows.len(),
        receipts = receipts.rows.len(),
        "loaded {}",
        path.display()
    );
    Ok(Workbook {
        accounts,
        payments,
        receipts,
    })
}

// ---------------------------------------------------------------------------
// CSV directory
// ---------------------------------------------------------------------------

fn read_csv_sheet(path: &Path, name: &str) -> Result<Sheet> {
    if !path.exists() {
        return Err(FinboardError::DataLoad(format!(
            "sheet '{name}' not found (expected {})",
            path.display()
        )));
    }
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: Vec<Cell> = record.iter().map(csv_cell).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }
    debug!(sheet = name, rows = rows.len(), "read csv sheet");
    Ok(Sheet::new(name, headers, rows))
}

/// CSV fields stay textual so codes like `3.10` or `0101` keep their exact form.
fn csv_cell(raw: &str) -> Cell {
    if raw.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(raw.to_string())
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet workbooks (xlsx, xls, ods)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn read_spreadsheet_sheet(
    book: &mut calamine::Sheets<std::io::BufReader<std::fs::File>>,
    name: &str,
) -> Result<Sheet> {
    use calamine::Reader;

    if !book.sheet_names().iter().any(|n| n == name) {
        return Err(FinboardError::DataLoad(format!(
            "sheet '{name}' not found (available: {})",
            book.sheet_names().join(", ")
        )));
    }
    let range = book
        .worksheet_range(name)
        .map_err(|e| FinboardError::DataLoad(format!("failed to read sheet '{name}': {e}")))?;
    let sheet = sheet_from_range(name, &range);
    debug!(sheet = name, rows = sheet.rows.len(), "read worksheet");
    Ok(sheet)
}

#[cfg(feature = "xlsx")]
fn sheet_from_range(name: &str, range: &calamine::Range<calamine::Data>) -> Sheet {
    let mut iter = range.rows();
    let headers: Vec<String> = iter
        .next()
        .map(|r| r.iter().map(|d| d.to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Cell>> = iter
        .map(|r| r.iter().map(spreadsheet_cell).collect::<Vec<Cell>>())
        .filter(|r| !r.iter().all(Cell::is_empty))
        .collect();
    Sheet::new(name, headers, rows)
}

#[cfg(feature = "xlsx")]
fn spreadsheet_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
    }
}
