use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::dates::MONTH_ABBREVIATIONS;
use crate::models::{Entry, RecordKind};

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Kpis {
    #[serde(with = "rust_decimal::serde::float")]
    pub receipts: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub payments: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub margin: Decimal,
}

pub fn kpis(rows: &[&Entry]) -> Kpis {
    let total_of = |kind: RecordKind| -> Decimal {
        rows.iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.value)
            .sum()
    };
    let receipts = total_of(RecordKind::Receipt);
    let payments = total_of(RecordKind::Payment);
    Kpis {
        receipts,
        payments,
        margin: receipts - payments,
    }
}

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// `None` collects rows whose account code matched no account.
    pub category: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Sum of unified value per account category, ascending by total.
pub fn category_breakdown(rows: &[&Entry]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<Option<String>, Decimal> = BTreeMap::new();
    for e in rows {
        *totals.entry(e.category.clone()).or_default() += e.value;
    }
    let mut items: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    items.sort_by(|a, b| a.total.cmp(&b.total));
    items
}

// ---------------------------------------------------------------------------
// Month breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub month: &'static str,
    /// `None` when no row falls in the month, as opposed to rows summing to zero.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
}

impl MonthTotal {
    pub fn value(&self) -> Decimal {
        self.total.unwrap_or(Decimal::ZERO)
    }
}

/// Sum of unified value per calendar month, always twelve entries Jan..Dec.
pub fn month_breakdown(rows: &[&Entry]) -> Vec<MonthTotal> {
    let mut totals: [Option<Decimal>; 12] = [None; 12];
    for e in rows {
        if let Some(slot) = totals.get_mut(e.month.wrapping_sub(1) as usize) {
            *slot = Some(slot.unwrap_or(Decimal::ZERO) + e.value);
        }
    }
    MONTH_ABBREVIATIONS
        .iter()
        .zip(totals)
        .map(|(month, total)| MonthTotal {
            month: *month,
            total,
        })
        .collect()
}
