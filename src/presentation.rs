use rust_decimal::Decimal;
use serde::Serialize;

use crate::fmt::DisplayFormat;
use crate::models::{Entry, FilterSelection, RecordKind};
use crate::reports::{CategoryTotal, Kpis, MonthTotal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiStrings {
    pub receipts: String,
    pub payments: String,
    pub margin: String,
}

pub fn kpi_strings(kpis: &Kpis, fmt: &DisplayFormat) -> KpiStrings {
    KpiStrings {
        receipts: fmt.money(kpis.receipts),
        payments: fmt.money(kpis.payments),
        margin: fmt.money(kpis.margin),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Bars grow along x, one per category on y.
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// No rows fed this bar (value reads as zero).
    pub empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarChartSpec {
    pub title: String,
    pub orientation: Orientation,
    pub category_axis: String,
    pub value_axis: String,
    pub bars: Vec<ChartBar>,
}

impl BarChartSpec {
    pub fn max_value(&self) -> Decimal {
        self.bars
            .iter()
            .map(|b| b.value.abs())
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Horizontal bars, ascending by total, unmatched accounts under `unclassified`.
pub fn category_chart(items: &[CategoryTotal], unclassified: &str) -> BarChartSpec {
    BarChartSpec {
        title: "Value by Category".to_string(),
        orientation: Orientation::Horizontal,
        category_axis: "Account Category".to_string(),
        value_axis: "Value".to_string(),
        bars: items
            .iter()
            .map(|c| ChartBar {
                label: c.category.clone().unwrap_or_else(|| unclassified.to_string()),
                value: c.total,
                empty: false,
            })
            .collect(),
    }
}

/// Vertical bars Jan..Dec for the selected year.
pub fn month_chart(items: &[MonthTotal], year: Option<i32>) -> BarChartSpec {
    let title = match year {
        Some(y) => format!("Monthly Total - {y}"),
        None => "Monthly Total".to_string(),
    };
    BarChartSpec {
        title,
        orientation: Orientation::Vertical,
        category_axis: "Month".to_string(),
        value_axis: "Value".to_string(),
        bars: items
            .iter()
            .map(|m| ChartBar {
                label: m.month.to_string(),
                value: m.value(),
                empty: m.total.is_none(),
            })
            .collect(),
    }
}

/// One display row. `value` stays numeric; two-decimal rendering is left to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub date: String,
    pub kind: RecordKind,
    pub supplier: Option<String>,
    pub category: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

pub fn table_rows(rows: &[&Entry], fmt: &DisplayFormat) -> Vec<TableRow> {
    rows.iter()
        .map(|e| TableRow {
            date: fmt.date(e.date),
            kind: e.kind,
            supplier: e.supplier.clone(),
            category: e.category.clone(),
            value: e.value,
        })
        .collect()
}

/// Everything one filter change produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub year: Option<i32>,
    pub kpis: KpiStrings,
    pub totals: Kpis,
    pub category_chart: BarChartSpec,
    pub month_chart: BarChartSpec,
    pub table: Vec<TableRow>,
}

impl Dashboard {
    pub fn page(&self, page: usize, page_size: usize) -> &[TableRow] {
        let size = page_size.max(1);
        let start = page.saturating_mul(size).min(self.table.len());
        let end = (start + size).min(self.table.len());
        &self.table[start..end]
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        self.table.len().div_ceil(page_size.max(1)).max(1)
    }
}

/// Human summary of the active filters, e.g. "2023 · Mar · Payment".
pub fn describe_selection(sel: &FilterSelection) -> String {
    let mut parts = Vec::new();
    match sel.year {
        Some(y) => parts.push(y.to_string()),
        None => parts.push("no year".to_string()),
    }
    if let Some(m) = sel.month {
        parts.push(crate::dates::month_abbrev(m).to_string());
    }
    if let Some(k) = sel.kind {
        parts.push(k.label().to_string());
    }
    if let Some(s) = sel.supplier.as_deref().filter(|s| !s.is_empty()) {
        parts.push(s.to_string());
    }
    if let Some(c) = sel.category.as_deref().filter(|s| !s.is_empty()) {
        parts.push(c.to_string());
    }
    parts.join(" \u{b7} ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::entry;
    use crate::reports::{category_breakdown, month_breakdown};
    use rust_decimal_macros::dec;

    #[test]
    fn test_kpi_strings() {
        let k = Kpis {
            receipts: dec!(1000),
            payments: dec!(400),
            margin: dec!(600),
        };
        let s = kpi_strings(&k, &DisplayFormat::default());
        assert_eq!(s.receipts, "$1,000.00");
        assert_eq!(s.payments, "$400.00");
        assert_eq!(s.margin, "$600.00");
    }

    #[test]
    fn test_category_chart_labels_unclassified() {
        let rows = vec![
            entry(RecordKind::Payment, (2023, 1, 1), None, None, dec!(5)),
            entry(RecordKind::Payment, (2023, 1, 2), None, Some("Rent"), dec!(50)),
        ];
        let refs: Vec<&Entry> = rows.iter().collect();
        let chart = category_chart(&category_breakdown(&refs), "Unclassified");
        assert_eq!(chart.orientation, Orientation::Horizontal);
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Unclassified", "Rent"]);
        assert_eq!(chart.max_value(), dec!(50));
    }

    #[test]
    fn test_month_chart_title_and_empty_bars() {
        let rows = vec![entry(RecordKind::Receipt, (2023, 3, 1), None, None, dec!(10))];
        let refs: Vec<&Entry> = rows.iter().collect();
        let chart = month_chart(&month_breakdown(&refs), Some(2023));
        assert_eq!(chart.title, "Monthly Total - 2023");
        assert_eq!(chart.bars.len(), 12);
        assert_eq!(chart.bars[2].label, "Mar");
        assert!(!chart.bars[2].empty);
        assert!(chart.bars[0].empty);
        assert_eq!(chart.bars[0].value, Decimal::ZERO);
    }

    #[test]
    fn test_table_rows_project_and_reformat() {
        let rows = vec![entry(
            RecordKind::Payment,
            (2023, 3, 7),
            Some("Landlord"),
            Some("Rent"),
            dec!(400.5),
        )];
        let refs: Vec<&Entry> = rows.iter().collect();
        let table = table_rows(&refs, &DisplayFormat::default());
        assert_eq!(
            table,
            vec![TableRow {
                date: "07/03/2023".into(),
                kind: RecordKind::Payment,
                supplier: Some("Landlord".into()),
                category: Some("Rent".into()),
                value: dec!(400.5),
            }]
        );
        let json = serde_json::to_value(&table[0]).unwrap();
        assert_eq!(json["value"], serde_json::json!(400.5));
        assert_eq!(json["kind"], serde_json::json!("Payment"));
    }

    #[test]
    fn test_describe_selection() {
        let sel = FilterSelection {
            year: Some(2023),
            month: Some(3),
            kind: Some(RecordKind::Receipt),
            supplier: None,
            category: Some("Sales".into()),
        };
        assert_eq!(describe_selection(&sel), "2023 \u{b7} Mar \u{b7} Receipt \u{b7} Sales");
    }
}
