use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::dates::derive_dates;
use crate::error::Result;
use crate::filter;
use crate::fmt::DisplayFormat;
use crate::loader::{load_workbook, Workbook};
use crate::merger::merge;
use crate::models::{Entry, FilterSelection, RecordKind};
use crate::normalizer::normalize;
use crate::presentation::{self, Dashboard};
use crate::reports;
use crate::settings::Settings;

/// Row counts gathered while building the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub accounts: usize,
    pub payments: usize,
    pub receipts: usize,
    pub unmatched: usize,
    pub skipped_dates: usize,
}

/// Values the filter controls offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Ascending; the last one is the default selection.
    pub years: Vec<i32>,
    /// Calendar order.
    pub months: Vec<u32>,
    pub kinds: Vec<RecordKind>,
    pub suppliers: Vec<String>,
    pub categories: Vec<String>,
}

/// The immutable base data every dashboard view is derived from. Built once
/// at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    entries: Vec<Entry>,
    summary: LoadSummary,
    unclassified_label: String,
}

impl Dataset {
    /// Load → normalize → merge → derive dates.
    pub fn load(path: &Path, settings: &Settings) -> Result<Self> {
        let book = load_workbook(path, settings)?;
        Self::from_workbook(book, settings)
    }

    pub fn from_workbook(book: Workbook, settings: &Settings) -> Result<Self> {
        let columns = &settings.columns;
        let transactions = normalize(&book.payments, &book.receipts, columns);
        let enriched = merge(transactions, &book.accounts, columns)?;
        let unmatched = enriched.iter().filter(|e| e.account.is_none()).count();
        let (entries, skipped_dates) = derive_dates(
            enriched,
            columns,
            settings.invalid_dates,
            (settings.sheets.payments.as_str(), settings.sheets.receipts.as_str()),
        )?;

        let summary = LoadSummary {
            accounts: book.accounts.rows.len(),
            payments: book.payments.rows.len(),
            receipts: book.receipts.rows.len(),
            unmatched,
            skipped_dates,
        };
        info!(entries = entries.len(), ?summary, "dataset ready");
        Ok(Self {
            entries,
            summary,
            unclassified_label: settings.unclassified_label.clone(),
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    pub fn options(&self) -> FilterOptions {
        let years: BTreeSet<i32> = self.entries.iter().map(|e| e.year).collect();
        let months: BTreeSet<u32> = self.entries.iter().map(|e| e.month).collect();
        let kinds: BTreeSet<RecordKind> = self.entries.iter().map(|e| e.kind).collect();
        let suppliers: BTreeSet<String> = self
            .entries
            .iter()
            .filter_map(|e| e.supplier.clone())
            .collect();
        let categories: BTreeSet<String> = self
            .entries
            .iter()
            .filter_map(|e| e.category.clone())
            .collect();
        FilterOptions {
            years: years.into_iter().collect(),
            months: months.into_iter().collect(),
            kinds: kinds.into_iter().collect(),
            suppliers: suppliers.into_iter().collect(),
            categories: categories.into_iter().collect(),
        }
    }

    /// Latest year present, no other filter.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection {
            year: self.entries.iter().map(|e| e.year).max(),
            ..FilterSelection::default()
        }
    }

    /// One recomputation cycle: filter, aggregate, present. KPIs, category
    /// chart and table follow every filter; the month chart only the year.
    pub fn recompute(&self, sel: &FilterSelection, fmt: &DisplayFormat) -> Dashboard {
        let filtered = filter::apply(&self.entries, sel);
        let year_scoped = filter::apply(&self.entries, &sel.year_only());

        let totals = reports::kpis(&filtered);
        let categories = reports::category_breakdown(&filtered);
        let months = reports::month_breakdown(&year_scoped);

        Dashboard {
            year: sel.year,
            kpis: presentation::kpi_strings(&totals, fmt),
            totals,
            category_chart: presentation::category_chart(&categories, &self.unclassified_label),
            month_chart: presentation::month_chart(&months, sel.year),
            table: presentation::table_rows(&filtered, fmt),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Cell, Sheet};
    use crate::settings::InvalidDatePolicy;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    pub(crate) fn workbook() -> Workbook {
        Workbook {
            accounts: Sheet::new(
                "Chart of Accounts",
                vec!["Account Code ".into(), " Level-3 Account".into()],
                vec![
                    vec![Cell::Number(101.0), text("Rent")],
                    vec![Cell::Number(201.0), text("Sales")],
                ],
            ),
            payments: Sheet::new(
                "Payments",
                vec![
                    "Account Code".into(),
                    "Supplier".into(),
                    "Issue Date".into(),
                    "Amount Paid".into(),
                ],
                vec![
                    vec![Cell::Number(101.0), text("Landlord"), text("2023-03-01"), Cell::Number(400.0)],
                    vec![Cell::Number(101.0), text("Landlord"), text("2023-06-01"), Cell::Number(400.0)],
                    vec![Cell::Number(555.0), text("Stranger"), text("2022-01-15"), Cell::Number(30.0)],
                ],
            ),
            receipts: Sheet::new(
                "Receipts",
                vec![
                    "Account Code".into(),
                    "Supplier".into(),
                    "Issue Date".into(),
                    "Amount Received".into(),
                ],
                vec![vec![Cell::Number(201.0), text("Client"), text("2023-03-10"), Cell::Number(1000.0)]],
            ),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_workbook(workbook(), &Settings::default()).unwrap()
    }

    #[test]
    fn test_build_keeps_every_row() {
        let ds = dataset();
        assert_eq!(ds.entries().len(), 4);
        assert_eq!(
            ds.summary(),
            &LoadSummary {
                accounts: 2,
                payments: 3,
                receipts: 1,
                unmatched: 1,
                skipped_dates: 0,
            }
        );
    }

    #[test]
    fn test_options_and_default_selection() {
        let ds = dataset();
        let opts = ds.options();
        assert_eq!(opts.years, vec![2022, 2023]);
        assert_eq!(opts.months, vec![1, 3, 6]);
        assert_eq!(opts.kinds, vec![RecordKind::Payment, RecordKind::Receipt]);
        assert_eq!(opts.suppliers, vec!["Client", "Landlord", "Stranger"]);
        assert_eq!(opts.categories, vec!["Rent", "Sales"]);
        assert_eq!(ds.default_selection(), FilterSelection::for_year(2023));
    }

    #[test]
    fn test_recompute_for_year() {
        let ds = dataset();
        let view = ds.recompute(&FilterSelection::for_year(2023), &DisplayFormat::default());
        assert_eq!(view.kpis.receipts, "$1,000.00");
        assert_eq!(view.kpis.payments, "$800.00");
        assert_eq!(view.kpis.margin, "$200.00");
        assert_eq!(view.table.len(), 3);
        assert_eq!(view.category_chart.bars.len(), 2);
        assert_eq!(view.month_chart.title, "Monthly Total - 2023");
        assert_eq!(view.month_chart.bars[2].value, dec!(1400));
        assert_eq!(view.month_chart.bars[5].value, dec!(400));
    }

    #[test]
    fn test_unmatched_supplier_keeps_full_year_month_chart() {
        let ds = dataset();
        let sel = FilterSelection {
            supplier: Some("Nobody".into()),
            ..FilterSelection::for_year(2023)
        };
        let view = ds.recompute(&sel, &DisplayFormat::default());
        assert_eq!(view.kpis.receipts, "$0.00");
        assert_eq!(view.kpis.payments, "$0.00");
        assert_eq!(view.kpis.margin, "$0.00");
        assert!(view.table.is_empty());
        assert!(view.category_chart.bars.is_empty());
        // month chart ignores the supplier filter
        let full_year = ds.recompute(&FilterSelection::for_year(2023), &DisplayFormat::default());
        assert_eq!(view.month_chart, full_year.month_chart);
        assert_eq!(view.month_chart.bars[2].value, dec!(1400));
    }

    #[test]
    fn test_month_chart_ignores_month_and_kind_filters() {
        let ds = dataset();
        let sel = FilterSelection {
            month: Some(6),
            kind: Some(RecordKind::Payment),
            ..FilterSelection::for_year(2023)
        };
        let view = ds.recompute(&sel, &DisplayFormat::default());
        assert_eq!(view.table.len(), 1);
        assert_eq!(view.totals.payments, dec!(400));
        assert_eq!(view.month_chart.bars[2].value, dec!(1400));
    }

    #[test]
    fn test_unmatched_accounts_group_as_unclassified() {
        let ds = dataset();
        let view = ds.recompute(&FilterSelection::for_year(2022), &DisplayFormat::default());
        assert_eq!(view.category_chart.bars.len(), 1);
        assert_eq!(view.category_chart.bars[0].label, "Unclassified");
        assert_eq!(view.table[0].category, None);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let ds = dataset();
        let sel = ds.default_selection();
        let a = ds.recompute(&sel, &DisplayFormat::default());
        let b = ds.recompute(&sel, &DisplayFormat::default());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_no_year_renders_degenerate_view() {
        let ds = dataset();
        let view = ds.recompute(&FilterSelection::default(), &DisplayFormat::default());
        assert_eq!(view.totals.margin, Decimal::ZERO);
        assert!(view.table.is_empty());
        assert_eq!(view.month_chart.bars.len(), 12);
        assert!(view.month_chart.bars.iter().all(|b| b.empty));
    }

    #[test]
    fn test_bad_date_policy() {
        let mut book = workbook();
        book.receipts.rows[0][2] = text("31/31/2023");
        let err = Dataset::from_workbook(book.clone(), &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("Receipts"));

        let settings = Settings {
            invalid_dates: InvalidDatePolicy::Skip,
            ..Settings::default()
        };
        let ds = Dataset::from_workbook(book, &settings).unwrap();
        assert_eq!(ds.entries().len(), 3);
        assert_eq!(ds.summary().skipped_dates, 1);
    }
}
