use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::models::{Cell, RecordKind, Sheet, TransactionRecord, TransactionSet};
use crate::settings::ColumnNames;

/// Parse an amount cell. Text tolerates thousands separators, a currency
/// prefix and parenthesized negatives; anything unparseable is missing.
pub fn parse_amount(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(n) => Decimal::from_f64(*n).map(|d| d.normalize()),
        Cell::Text(raw) => parse_amount_text(raw),
        _ => None,
    }
}

fn parse_amount_text(raw: &str) -> Option<Decimal> {
    let s = raw.trim().trim_matches('"').trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return parse_amount_text(inner).map(|d| -d);
    }
    if let Some(rest) = s.strip_prefix('-') {
        return parse_amount_text(rest).map(|d| -d);
    }
    // only a leading currency prefix (`$`, `R$`, `USD`) may carry letters
    let digits: String = s
        .trim_start_matches(|c: char| c.is_alphabetic() || c == '$')
        .chars()
        .filter(|c| !matches!(c, ',' | ' '))
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<Decimal>().ok()
}

/// Tag payment and receipt rows with their kind and concatenate them,
/// payments first, computing the unified value
/// `paid.unwrap_or(0) + received.unwrap_or(0)` for every row.
pub fn normalize(payments: &Sheet, receipts: &Sheet, columns: &ColumnNames) -> TransactionSet {
    let mut set = TransactionSet::default();
    for (sheet, kind) in [(payments, RecordKind::Payment), (receipts, RecordKind::Receipt)] {
        for h in &sheet.headers {
            if !set.columns.contains(h) {
                set.columns.push(h.clone());
            }
        }
        let paid_col = sheet.column(&columns.paid_amount);
        let received_col = sheet.column(&columns.received_amount);
        for idx in 0..sheet.rows.len() {
            let paid = paid_col.and_then(|c| parse_amount(sheet.cell(idx, c)));
            let received = received_col.and_then(|c| parse_amount(sheet.cell(idx, c)));
            let value = paid.unwrap_or(Decimal::ZERO) + received.unwrap_or(Decimal::ZERO);
            set.records.push(TransactionRecord {
                kind,
                source_row: idx + 1,
                fields: sheet.record(idx),
                paid,
                received,
                value,
            });
        }
    }
    set
}
