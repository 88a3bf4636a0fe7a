use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Cell as UiCell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::cli::open_dataset;
use crate::dataset::{Dataset, FilterOptions};
use crate::dates::month_abbrev;
use crate::error::Result;
use crate::fmt::{compact, DisplayFormat};
use crate::models::FilterSelection;
use crate::presentation::{describe_selection, BarChartSpec, Dashboard};
use crate::settings::Settings;
use crate::tui::{
    money_span, run_view, InteractiveView, ViewAction, FOOTER_STYLE, HEADER_STYLE,
    SELECTED_STYLE,
};

const HEADER_ROW_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);
const BAR_STYLE: Style = Style::new().fg(Color::Rgb(90, 150, 230));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Year,
    Month,
    Kind,
    Supplier,
    Category,
}

impl Control {
    const ALL: [Control; 5] = [
        Control::Year,
        Control::Month,
        Control::Kind,
        Control::Supplier,
        Control::Category,
    ];

    fn label(self) -> &'static str {
        match self {
            Control::Year => "Year",
            Control::Month => "Month",
            Control::Kind => "Kind",
            Control::Supplier => "Supplier",
            Control::Category => "Category",
        }
    }

    fn shift(self, delta: isize) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(idx + delta).rem_euclid(len) as usize]
    }
}

/// Step through `values` from `current`. Optional controls get a leading
/// "all" slot (`None`); an unknown current value restarts at the first slot.
fn cycle<T: Clone + PartialEq>(
    current: Option<&T>,
    values: &[T],
    delta: isize,
    optional: bool,
) -> Option<T> {
    let mut slots: Vec<Option<&T>> = Vec::with_capacity(values.len() + 1);
    if optional {
        slots.push(None);
    }
    slots.extend(values.iter().map(Some));
    if slots.is_empty() {
        return current.cloned();
    }
    let len = slots.len() as isize;
    let next = match slots.iter().position(|s| *s == current) {
        Some(pos) => (pos as isize + delta).rem_euclid(len) as usize,
        None => 0,
    };
    slots[next].cloned()
}

/// Rows for the table panel: one page plus header and borders.
fn table_height(page_size: usize) -> u16 {
    u16::try_from(page_size).unwrap_or(u16::MAX).saturating_add(3)
}

fn bar_height(value: Decimal) -> u64 {
    value.abs().round().to_u64().unwrap_or(0)
}

pub(crate) struct DashboardView<'a> {
    dataset: &'a Dataset,
    options: FilterOptions,
    format: DisplayFormat,
    page_size: usize,
    selection: FilterSelection,
    focus: Control,
    page: usize,
    view: Dashboard,
}

impl<'a> DashboardView<'a> {
    pub(crate) fn new(dataset: &'a Dataset, settings: &Settings) -> Self {
        let selection = dataset.default_selection();
        let view = dataset.recompute(&selection, &settings.format);
        Self {
            dataset,
            options: dataset.options(),
            format: settings.format.clone(),
            page_size: settings.page_size.max(1),
            selection,
            focus: Control::Year,
            page: 0,
            view,
        }
    }

    fn refresh(&mut self) {
        self.view = self.dataset.recompute(&self.selection, &self.format);
        self.page = 0;
    }

    fn step(&mut self, delta: isize) {
        let o = &self.options;
        let sel = &mut self.selection;
        match self.focus {
            Control::Year => sel.year = cycle(sel.year.as_ref(), &o.years, delta, false),
            Control::Month => sel.month = cycle(sel.month.as_ref(), &o.months, delta, true),
            Control::Kind => sel.kind = cycle(sel.kind.as_ref(), &o.kinds, delta, true),
            Control::Supplier => {
                sel.supplier = cycle(sel.supplier.as_ref(), &o.suppliers, delta, true)
            }
            Control::Category => {
                sel.category = cycle(sel.category.as_ref(), &o.categories, delta, true)
            }
        }
        self.refresh();
    }

    /// Reset the focused control; the year always keeps a value.
    fn clear(&mut self) {
        let sel = &mut self.selection;
        match self.focus {
            Control::Year => return,
            Control::Month => sel.month = None,
            Control::Kind => sel.kind = None,
            Control::Supplier => sel.supplier = None,
            Control::Category => sel.category = None,
        }
        self.refresh();
    }

    fn control_value(&self, control: Control) -> String {
        let sel = &self.selection;
        let value = match control {
            Control::Year => sel.year.map(|y| y.to_string()),
            Control::Month => sel.month.map(|m| month_abbrev(m).to_string()),
            Control::Kind => sel.kind.map(|k| k.label().to_string()),
            Control::Supplier => sel.supplier.clone(),
            Control::Category => sel.category.clone(),
        };
        value.unwrap_or_else(|| "All".to_string())
    }

    fn draw_filters(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for control in Control::ALL {
            let text = format!(" {}: {} ", control.label(), self.control_value(control));
            if control == self.focus {
                spans.push(Span::styled(text, SELECTED_STYLE));
            } else {
                spans.push(Span::raw(text));
            }
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_kpis(&self, frame: &mut Frame, area: Rect) {
        let [left, mid, right] = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(area);
        let totals = &self.view.totals;
        for (title, value, slot) in [
            ("Receipts", totals.receipts, left),
            ("Payments", totals.payments, mid),
            ("Margin", totals.margin, right),
        ] {
            let card = Paragraph::new(Line::from(vec![
                Span::raw(" "),
                money_span(value, &self.format),
            ]))
            .block(Block::bordered().title(title));
            frame.render_widget(card, slot);
        }
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect, chart: &BarChartSpec) {
        let block = Block::bordered()
            .title(chart.title.as_str())
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        if chart.bars.is_empty() {
            frame.render_widget(
                Paragraph::new(" No data for this selection.")
                    .style(FOOTER_STYLE)
                    .block(block),
                area,
            );
            return;
        }

        let horizontal = chart.orientation == crate::presentation::Orientation::Horizontal;
        let bars: Vec<Bar> = chart
            .bars
            .iter()
            .map(|b| {
                let text = if horizontal {
                    self.format.amount(b.value)
                } else {
                    compact(b.value.to_f64().unwrap_or(0.0))
                };
                Bar::default()
                    .value(bar_height(b.value))
                    .text_value(text)
                    .label(Line::from(b.label.clone()))
                    .style(BAR_STYLE)
            })
            .collect();

        let mut widget = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars));
        widget = if horizontal {
            widget.direction(Direction::Horizontal).bar_width(1).bar_gap(0)
        } else {
            widget.bar_width(4).bar_gap(1)
        };
        frame.render_widget(widget, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec!["Date", "Kind", "Supplier", "Account Category", "Value"])
            .style(HEADER_ROW_STYLE);
        let rows: Vec<Row> = self
            .view
            .page(self.page, self.page_size)
            .iter()
            .map(|r| {
                Row::new(vec![
                    UiCell::from(r.date.clone()),
                    UiCell::from(r.kind.label()),
                    UiCell::from(r.supplier.clone().unwrap_or_default()),
                    UiCell::from(r.category.clone().unwrap_or_default()),
                    UiCell::from(
                        Line::from(self.format.amount(r.value)).alignment(Alignment::Right),
                    ),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(16),
        ];
        let title = format!(
            "Transactions \u{2014} page {}/{} ({} rows)",
            self.page + 1,
            self.view.page_count(self.page_size),
            self.view.table.len()
        );
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(title));
        frame.render_widget(table, area);
    }
}

impl InteractiveView for DashboardView<'_> {
    fn draw(&mut self, frame: &mut Frame) {
        let table_height = table_height(self.page_size);
        let [header_area, filter_area, kpi_area, chart_area, table_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Length(table_height),
                Constraint::Length(1),
            ])
            .areas(frame.area());

        frame.render_widget(
            Paragraph::new(format!(
                " Finboard \u{2014} {}",
                describe_selection(&self.selection)
            ))
            .style(HEADER_STYLE),
            header_area,
        );
        self.draw_filters(frame, filter_area);
        self.draw_kpis(frame, kpi_area);

        let [chart_left, chart_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(chart_area);
        self.draw_chart(frame, chart_left, &self.view.category_chart);
        self.draw_chart(frame, chart_right, &self.view.month_chart);

        self.draw_table(frame, table_area);

        frame.render_widget(
            Paragraph::new(
                " Tab=next filter  \u{2190}/\u{2192}=change  x=clear  PgUp/PgDn=page  q=quit",
            )
            .style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Tab => self.focus = self.focus.shift(1),
            KeyCode::BackTab => self.focus = self.focus.shift(-1),
            KeyCode::Left | KeyCode::Char('h') => self.step(-1),
            KeyCode::Right | KeyCode::Char('l') => self.step(1),
            KeyCode::Char('x') | KeyCode::Backspace | KeyCode::Delete => self.clear(),
            KeyCode::PageDown | KeyCode::Char('n') => {
                if self.page + 1 < self.view.page_count(self.page_size) {
                    self.page += 1;
                }
            }
            KeyCode::PageUp | KeyCode::Char('p') => {
                self.page = self.page.saturating_sub(1);
            }
            _ => {}
        }
        ViewAction::Continue
    }
}

pub fn run(workbook: Option<&str>) -> Result<()> {
    let (settings, dataset) = open_dataset(workbook)?;
    let mut view = DashboardView::new(&dataset, &settings);
    run_view(&mut view)
}
