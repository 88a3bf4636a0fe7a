use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{FinboardError, Result};

/// A single worksheet cell, independent of the source format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30, fraction = time of day).
    DateTime(f64),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text content for label-like columns (supplier, category). Blank text is `None`.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) | Cell::DateTime(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Normalized join key. Text is compared trimmed but otherwise verbatim;
    /// integral numbers drop their fractional part so a numeric `101.0`
    /// matches a textual `"101"`.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            other => other.as_label(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_label() {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A rectangular table read from one sheet: a header row followed by data rows.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, col); short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn trim_headers(&mut self) {
        for h in &mut self.headers {
            *h = h.trim().to_string();
        }
    }

    /// Fail with `DataLoad` naming every column in `names` that the header row lacks.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| self.column(n).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FinboardError::DataLoad(format!(
                "sheet '{}' is missing column(s): {}",
                self.name,
                missing.join(", ")
            )))
        }
    }

    /// Row `idx` as a column-name keyed map.
    pub fn record(&self, idx: usize) -> BTreeMap<String, Cell> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, h)| (h.clone(), self.cell(idx, col).clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RecordKind {
    Payment,
    Receipt,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Payment => "Payment",
            RecordKind::Receipt => "Receipt",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = FinboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "payment" | "payments" => Ok(RecordKind::Payment),
            "receipt" | "receipts" => Ok(RecordKind::Receipt),
            other => Err(FinboardError::Other(format!(
                "Unknown record kind '{other}' (expected payment or receipt)"
            ))),
        }
    }
}

/// The part of a chart-of-accounts row a matched transaction carries.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub category: Option<String>,
}

/// A payment or receipt row after normalization. `fields` keeps every
/// column of the source sheet.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub kind: RecordKind,
    /// 1-based data row in the source sheet (header excluded).
    pub source_row: usize,
    pub fields: BTreeMap<String, Cell>,
    pub paid: Option<Decimal>,
    pub received: Option<Decimal>,
    pub value: Decimal,
}

impl TransactionRecord {
    pub fn field(&self, column: &str) -> &Cell {
        self.fields.get(column).unwrap_or(&EMPTY_CELL)
    }
}

/// All payment and receipt rows, payments first. `columns` is the union of
/// both sheets' headers in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TransactionSet {
    pub columns: Vec<String>,
    pub records: Vec<TransactionRecord>,
}

/// A transaction left-joined with its chart-of-accounts row, if any.
#[derive(Debug, Clone)]
pub struct EnrichedTransaction {
    pub record: TransactionRecord,
    pub account: Option<Arc<AccountRecord>>,
}

impl EnrichedTransaction {
    pub fn category(&self) -> Option<&str> {
        self.account.as_ref().and_then(|a| a.category.as_deref())
    }
}

/// The row shape every dashboard computation works on: an enriched
/// transaction with its issue date resolved.
#[derive(Debug, Clone)]
pub struct Entry {
    pub kind: RecordKind,
    pub date: NaiveDate,
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    pub supplier: Option<String>,
    pub category: Option<String>,
    pub value: Decimal,
}

/// Current values of the dashboard's filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub kind: Option<RecordKind>,
    pub supplier: Option<String>,
    pub category: Option<String>,
}

impl FilterSelection {
    #[cfg(test)]
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    /// The same selection with only the year kept.
    pub fn year_only(&self) -> Self {
        Self {
            year: self.year,
            ..Self::default()
        }
    }
}
