//! Self-contained HTML rendering of one dashboard bundle.
//!
//! KPIs and charts are rendered to static markup (inline SVG); the
//! transaction table is embedded as JSON and paginated client-side.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::fmt::DisplayFormat;
use crate::models::FilterSelection;
use crate::presentation::{describe_selection, BarChartSpec, Dashboard, Orientation, TableRow};

#[derive(Serialize)]
struct PageData<'a> {
    page_size: usize,
    decimal_separator: &'a str,
    thousands_separator: &'a str,
    rows: &'a [TableRow],
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize for embedding inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn ratio(value: Decimal, max: Decimal) -> f64 {
    if max.is_zero() {
        return 0.0;
    }
    (value.abs() / max).to_f64().unwrap_or(0.0).clamp(0.0, 1.0)
}

fn horizontal_svg(chart: &BarChartSpec, fmt: &DisplayFormat) -> String {
    if chart.bars.is_empty() {
        return r#"<p class="empty">No data for this selection.</p>"#.to_string();
    }
    let row_h = 28.0;
    let label_w = 180.0;
    let plot_w = 320.0;
    let height = row_h * chart.bars.len() as f64 + 10.0;
    let max = chart.max_value();
    let mut svg = format!(
        r#"<svg viewBox="0 0 {w} {height}" width="100%" role="img" aria-label="{title}">"#,
        w = label_w + plot_w + 110.0,
        title = escape(&chart.title)
    );
    for (i, bar) in chart.bars.iter().enumerate() {
        let y = i as f64 * row_h + 5.0;
        let w = ratio(bar.value, max) * plot_w;
        svg.push_str(&format!(
            r#"<text x="{lx}" y="{ty}" text-anchor="end" class="lbl">{label}</text><rect x="{label_w}" y="{y}" width="{w:.1}" height="{bh}" class="bar{neg}"/><text x="{vx:.1}" y="{ty}" class="val">{value}</text>"#,
            lx = label_w - 8.0,
            ty = y + row_h * 0.6,
            label = escape(&bar.label),
            bh = row_h - 8.0,
            neg = if bar.value.is_sign_negative() { " neg" } else { "" },
            vx = label_w + w + 6.0,
            value = escape(&fmt.money(bar.value)),
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn vertical_svg(chart: &BarChartSpec, fmt: &DisplayFormat) -> String {
    let col_w = 44.0;
    let plot_h = 220.0;
    let width = col_w * chart.bars.len() as f64 + 10.0;
    let max = chart.max_value();
    let mut svg = format!(
        r#"<svg viewBox="0 0 {width} {h}" width="100%" role="img" aria-label="{title}">"#,
        h = plot_h + 40.0,
        title = escape(&chart.title)
    );
    for (i, bar) in chart.bars.iter().enumerate() {
        let x = i as f64 * col_w + 8.0;
        let h = ratio(bar.value, max) * plot_h;
        svg.push_str(&format!(
            r#"<g><title>{label}: {value}</title><rect x="{x}" y="{y:.1}" width="{bw}" height="{h:.1}" class="bar{neg}"/><text x="{tx}" y="{ly}" text-anchor="middle" class="lbl">{label}</text></g>"#,
            label = escape(&bar.label),
            value = if bar.empty {
                "no rows".to_string()
            } else {
                escape(&fmt.money(bar.value))
            },
            y = plot_h - h + 10.0,
            bw = col_w - 10.0,
            neg = if bar.value.is_sign_negative() { " neg" } else { "" },
            tx = x + (col_w - 10.0) / 2.0,
            ly = plot_h + 28.0,
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn chart_svg(chart: &BarChartSpec, fmt: &DisplayFormat) -> String {
    match chart.orientation {
        Orientation::Horizontal => horizontal_svg(chart, fmt),
        Orientation::Vertical => vertical_svg(chart, fmt),
    }
}

/// Render the full page for `view`.
pub fn generate(
    view: &Dashboard,
    selection: &FilterSelection,
    fmt: &DisplayFormat,
    page_size: usize,
) -> String {
    let data = PageData {
        page_size: page_size.max(1),
        decimal_separator: &fmt.decimal_separator,
        thousands_separator: &fmt.thousands_separator,
        rows: &view.table,
    };
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Finboard &mdash; {selection}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #222; }}
h1 {{ text-align: center; }}
.filters {{ color: #666; text-align: center; margin-bottom: 1.5rem; }}
.kpis {{ display: flex; gap: 1rem; margin-bottom: 1.5rem; }}
.card {{ border: 1px solid #ddd; border-radius: 6px; min-width: 12rem; }}
.card h2 {{ font-size: .9rem; margin: 0; padding: .5rem .75rem; background: #f5f5f5; border-bottom: 1px solid #ddd; }}
.card p {{ font-size: 1.3rem; margin: .75rem; }}
.charts {{ display: flex; gap: 2rem; }}
.charts section {{ flex: 1; }}
.bar {{ fill: #3b73b9; }}
.bar.neg {{ fill: #c0392b; }}
.lbl, .val {{ font-size: 12px; fill: #333; }}
.empty {{ color: #888; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border-bottom: 1px solid #eee; padding: .35rem .6rem; text-align: left; }}
td.num {{ text-align: right; font-variant-numeric: tabular-nums; }}
.pager {{ margin-top: .75rem; display: flex; gap: .75rem; align-items: center; }}
</style>
</head>
<body>
<h1>Finboard</h1>
<div class="filters">{selection}</div>
<div class="kpis">
<div class="card"><h2>Receipts</h2><p>{receipts}</p></div>
<div class="card"><h2>Payments</h2><p>{payments}</p></div>
<div class="card"><h2>Margin</h2><p>{margin}</p></div>
</div>
<div class="charts">
<section><h3>{category_title}</h3>{category_svg}</section>
<section><h3>{month_title}</h3>{month_svg}</section>
</div>
<hr>
<h3>Transactions</h3>
<table>
<thead><tr><th>Date</th><th>Kind</th><th>Supplier</th><th>Account Category</th><th>Value</th></tr></thead>
<tbody id="rows"></tbody>
</table>
<div class="pager"><button id="prev">&larr;</button><span id="pos"></span><button id="next">&rarr;</button></div>
<script id="data" type="application/json">{data}</script>
<script>
const data = JSON.parse(document.getElementById('data').textContent);
let page = 0;
const pages = Math.max(1, Math.ceil(data.rows.length / data.page_size));
function esc(s) {{
  return String(s ?? '').replace(/[&<>"']/g, c => ({{'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}})[c]);
}}
function amount(v) {{
  const [i, d] = Math.abs(v).toFixed(2).split('.');
  const grouped = i.replace(/\B(?=(\d{{3}})+(?!\d))/g, data.thousands_separator);
  return (v < 0 ? '-' : '') + grouped + data.decimal_separator + d;
}}
function render() {{
  const start = page * data.page_size;
  document.getElementById('rows').innerHTML = data.rows.slice(start, start + data.page_size).map(r =>
    `<tr><td>${{esc(r.date)}}</td><td>${{esc(r.kind)}}</td><td>${{esc(r.supplier)}}</td><td>${{esc(r.category)}}</td><td class="num">${{amount(r.value)}}</td></tr>`
  ).join('');
  document.getElementById('pos').textContent = `Page ${{page + 1}} of ${{pages}} (${{data.rows.length}} rows)`;
}}
document.getElementById('prev').onclick = () => {{ if (page > 0) {{ page--; render(); }} }};
document.getElementById('next').onclick = () => {{ if (page < pages - 1) {{ page++; render(); }} }};
render();
</script>
</body>
</html>
"##,
        selection = escape(&describe_selection(selection)),
        receipts = escape(&view.kpis.receipts),
        payments = escape(&view.kpis.payments),
        margin = escape(&view.kpis.margin),
        category_title = escape(&view.category_chart.title),
        category_svg = chart_svg(&view.category_chart, fmt),
        month_title = escape(&view.month_chart.title),
        month_svg = chart_svg(&view.month_chart, fmt),
        data = script_json(&data),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordKind;
    use crate::presentation::{ChartBar, KpiStrings};
    use crate::reports::Kpis;
    use rust_decimal_macros::dec;

    fn view() -> Dashboard {
        Dashboard {
            year: Some(2023),
            kpis: KpiStrings {
                receipts: "$1,000.00".into(),
                payments: "$400.00".into(),
                margin: "$600.00".into(),
            },
            totals: Kpis {
                receipts: dec!(1000),
                payments: dec!(400),
                margin: dec!(600),
            },
            category_chart: BarChartSpec {
                title: "Value by Category".into(),
                orientation: Orientation::Horizontal,
                category_axis: "Account Category".into(),
                value_axis: "Value".into(),
                bars: vec![ChartBar {
                    label: "R&D <lab>".into(),
                    value: dec!(400),
                    empty: false,
                }],
            },
            month_chart: BarChartSpec {
                title: "Monthly Total - 2023".into(),
                orientation: Orientation::Vertical,
                category_axis: "Month".into(),
                value_axis: "Value".into(),
                bars: vec![ChartBar {
                    label: "Mar".into(),
                    value: dec!(1400),
                    empty: false,
                }],
            },
            table: vec![TableRow {
                date: "01/03/2023".into(),
                kind: RecordKind::Payment,
                supplier: Some("</script><b>".into()),
                category: None,
                value: dec!(400),
            }],
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_generate_embeds_kpis_and_charts() {
        let html = generate(
            &view(),
            &FilterSelection::for_year(2023),
            &DisplayFormat::default(),
            10,
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("$1,000.00"));
        assert!(html.contains("Monthly Total - 2023"));
        assert!(html.contains("R&amp;D &lt;lab&gt;"));
        assert!(html.contains(r#""page_size":10"#));
    }

    #[test]
    fn test_embedded_json_cannot_close_script() {
        let html = generate(
            &view(),
            &FilterSelection::for_year(2023),
            &DisplayFormat::default(),
            10,
        );
        assert!(!html.contains("</script><b>"));
        assert!(html.contains(r"<\/script><b>"));
    }

    #[test]
    fn test_empty_category_chart_message() {
        let mut v = view();
        v.category_chart.bars.clear();
        let html = generate(&v, &FilterSelection::for_year(2023), &DisplayFormat::default(), 10);
        assert!(html.contains("No data for this selection."));
    }
}
