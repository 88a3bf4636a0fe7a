use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{open_dataset, FilterArgs};
use crate::error::{FinboardError, Result};
use crate::fmt::DisplayFormat;
use crate::presentation::{describe_selection, BarChartSpec, Dashboard};

pub fn run(
    workbook: Option<&str>,
    filters: &FilterArgs,
    json: bool,
    page: Option<usize>,
) -> Result<()> {
    let (settings, dataset) = open_dataset(workbook)?;
    let selection = filters.selection(&dataset)?;
    let view = dataset.recompute(&selection, &settings.format);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", format!("Dashboard \u{2014} {}", describe_selection(&selection)).bold());
    println!();
    println!("{}", kpi_table(&view));
    println!();
    println!("{}\n{}", view.category_chart.title.bold(), chart_table(&view.category_chart, &settings.format));
    println!();
    println!("{}\n{}", view.month_chart.title.bold(), chart_table(&view.month_chart, &settings.format));
    println!();

    let size = settings.page_size;
    let rows = match page {
        Some(0) => return Err(FinboardError::Other("Pages start at 1".into())),
        Some(p) => {
            if p > view.page_count(size) {
                return Err(FinboardError::Other(format!(
                    "Page {p} is out of range (1-{})",
                    view.page_count(size)
                )));
            }
            view.page(p - 1, size)
        }
        None => &view.table[..],
    };
    let mut table = Table::new();
    table.set_header(vec!["Date", "Kind", "Supplier", "Account Category", "Value"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(&r.date),
            Cell::new(r.kind.label()),
            Cell::new(r.supplier.as_deref().unwrap_or("")),
            Cell::new(r.category.as_deref().unwrap_or("")),
            Cell::new(settings.format.amount(r.value)).set_alignment(CellAlignment::Right),
        ]);
    }
    let heading = match page {
        Some(p) => format!(
            "Transactions (page {p} of {}, {} rows)",
            view.page_count(size),
            view.table.len()
        ),
        None => format!("Transactions ({} rows)", view.table.len()),
    };
    println!("{}\n{table}", heading.bold());
    Ok(())
}

fn kpi_table(view: &Dashboard) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Receipts", "Payments", "Margin"]);
    let margin = if view.totals.margin.is_sign_negative() && !view.totals.margin.is_zero() {
        view.kpis.margin.red().bold()
    } else {
        view.kpis.margin.green().bold()
    };
    table.add_row(vec![
        Cell::new(&view.kpis.receipts),
        Cell::new(&view.kpis.payments),
        Cell::new(margin),
    ]);
    table
}

fn chart_table(chart: &BarChartSpec, fmt: &DisplayFormat) -> Table {
    let mut table = Table::new();
    table.set_header(vec![chart.category_axis.as_str(), chart.value_axis.as_str()]);
    for bar in &chart.bars {
        let value = if bar.empty {
            "\u{2014}".to_string()
        } else {
            fmt.money(bar.value)
        };
        table.add_row(vec![
            Cell::new(&bar.label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
