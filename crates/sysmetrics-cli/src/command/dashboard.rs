use anyhow::Context;
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect, Spacing},
    style::{Color, Modifier, Style},
    symbols::{Marker, merge::MergeStrategy},
    text::{Line, Text},
    widgets::{
        Axis, Bar, BarChart, Block, Chart, Dataset, GraphType, LegendPosition, Paragraph, Row,
        Table, Widget, Wrap,
    },
};
use sysmetrics_analysis::{Dimension, EventAnalysis};
use sysmetrics_events::SystemEvent;
use sysmetrics_stats::frequency::{FrequencyDistribution, FrequencyRow};

use crate::{
    tui::{self, App},
    util::{self, AnalysisConfigArg, EventSourceArg},
    view,
};

const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DashboardArg {
    #[command(flatten)]
    source: EventSourceArg,

    #[command(flatten)]
    config: AnalysisConfigArg,
}

pub(crate) fn run(arg: &DashboardArg) -> anyhow::Result<()> {
    let events = arg.source.load()?;
    let config = arg.config.load()?;
    let analysis = util::analyze(&events, &config)?;

    let mut app = DashboardApp::new(events, analysis);
    tui::run(&mut app).context("Failed to run dashboard")?;
    Ok(())
}

/// What the right-hand side of the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    /// Bar chart and frequency table of one dimension.
    Distributions,
    /// Response time per event and the raw event list.
    Events,
}

#[derive(Debug)]
struct DashboardApp {
    events: Vec<SystemEvent>,
    analysis: EventAnalysis,
    view: View,
    selected_dimension: usize,
    bin_order: bool,
    event_offset: usize,
    should_exit: bool,
}

impl DashboardApp {
    fn new(events: Vec<SystemEvent>, analysis: EventAnalysis) -> Self {
        Self {
            events,
            analysis,
            view: View::Distributions,
            selected_dimension: 0,
            bin_order: false,
            event_offset: 0,
            should_exit: false,
        }
    }

    fn dimension(&self) -> Dimension {
        Dimension::ALL[self.selected_dimension]
    }

    fn in_bin_order(&self) -> bool {
        self.bin_order && self.dimension().is_numeric()
    }

    /// Rows of the selected dimension in the order the chart shows them.
    fn chart_rows(&self) -> Vec<&FrequencyRow> {
        let dist = self.analysis.tables.get(self.dimension());
        if self.in_bin_order() {
            dist.rows_in_bin_order()
        } else {
            dist.iter().collect()
        }
    }

    fn scroll_events(&mut self, delta: isize) {
        let last = self.events.len().saturating_sub(1);
        self.event_offset = self.event_offset.saturating_add_signed(delta).min(last);
    }

    fn draw_distributions(&self, frame: &mut Frame, area: Rect) {
        let [chart_pane, table_pane] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                .spacing(Spacing::Overlap(1))
                .areas(area);

        let dimension = self.dimension();
        let order = if self.in_bin_order() {
            "bin order"
        } else {
            "by frequency"
        };
        frame.render_widget(
            DistributionChart {
                title: format!("{} ({order})", dimension.title()),
                rows: self.chart_rows(),
            },
            chart_pane,
        );
        frame.render_widget(
            FrequencyTable {
                dimension,
                dist: self.analysis.tables.get(dimension),
            },
            table_pane,
        );
    }

    fn draw_events(&self, frame: &mut Frame, area: Rect) {
        let [scatter_pane, table_pane] =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                .spacing(Spacing::Overlap(1))
                .areas(area);

        frame.render_widget(
            ResponseTimeScatter {
                events: &self.events,
            },
            scatter_pane,
        );
        frame.render_widget(
            EventTable {
                events: &self.events,
                offset: self.event_offset,
            },
            table_pane,
        );
    }
}

impl App for DashboardApp {
    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn handle_event(&mut self, event: &Event) {
        let len = Dimension::ALL.len();
        if let Some(event) = event.as_key_event() {
            match (self.view, event.code) {
                (_, KeyCode::Char('q') | KeyCode::Esc) => self.should_exit = true,
                (View::Distributions, KeyCode::Char('v')) => self.view = View::Events,
                (View::Events, KeyCode::Char('v')) => self.view = View::Distributions,
                (View::Distributions, KeyCode::Char('h')) => self.bin_order = !self.bin_order,
                (View::Distributions, KeyCode::Right | KeyCode::Tab) => {
                    self.selected_dimension = (self.selected_dimension + 1) % len;
                }
                (View::Distributions, KeyCode::Left | KeyCode::BackTab) => {
                    self.selected_dimension =
                        self.selected_dimension.checked_sub(1).unwrap_or(len - 1);
                }
                (View::Events, KeyCode::Down) => self.scroll_events(1),
                (View::Events, KeyCode::Up) => self.scroll_events(-1),
                (View::Events, KeyCode::PageDown) => self.scroll_events(PAGE_SIZE.cast_signed()),
                (View::Events, KeyCode::PageUp) => self.scroll_events(-PAGE_SIZE.cast_signed()),
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Length(44), Constraint::Fill(1)])
                .spacing(Spacing::Overlap(1))
                .areas(main_area);

        let [summary_pane, report_pane] =
            Layout::vertical([Constraint::Length(13), Constraint::Fill(1)])
                .spacing(Spacing::Overlap(1))
                .areas(left_area);

        frame.render_widget(SummaryPane { analysis: &self.analysis }, summary_pane);
        frame.render_widget(ReportPane { analysis: &self.analysis }, report_pane);

        let help = match self.view {
            View::Distributions => {
                self.draw_distributions(frame, right_area);
                let order = if self.bin_order { "bin" } else { "frequency" };
                format!(
                    "←/→/Tab: Dimension | h: Histogram Order ({order}) | v: Events | q/Esc: Quit"
                )
            }
            View::Events => {
                self.draw_events(frame, right_area);
                "↑/↓/PgUp/PgDn: Scroll | v: Distributions | q/Esc: Quit".to_owned()
            }
        };
        let help_text = Text::from(help)
            .style(Style::default().fg(Color::DarkGray))
            .centered();
        frame.render_widget(help_text, help_area);
    }
}

fn pane(title: impl Into<Line<'static>>) -> Block<'static> {
    Block::bordered()
        .merge_borders(MergeStrategy::Exact)
        .title(title)
}

struct SummaryPane<'a> {
    analysis: &'a EventAnalysis,
}

impl Widget for SummaryPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let rows = view::summary_rows(self.analysis)
            .into_iter()
            .map(|(name, value)| Row::new([name.to_owned(), value]));
        let table = Table::new(rows, [Constraint::Length(22), Constraint::Fill(1)])
            .block(pane("Summary"));
        Widget::render(table, area, buf);
    }
}

struct ReportPane<'a> {
    analysis: &'a EventAnalysis,
}

impl Widget for ReportPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let report = self.analysis.report();
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::styled("Interpretation", bold),
            Line::raw(report.interpretation),
            Line::default(),
            Line::styled("Patterns", bold),
        ];
        lines.extend(
            report
                .patterns
                .into_iter()
                .map(|pattern| Line::raw(format!("- {pattern}"))),
        );
        lines.extend([
            Line::default(),
            Line::styled("Suggestion", bold),
            Line::raw(report.suggestion),
        ]);

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(pane("Report"));
        Widget::render(paragraph, area, buf);
    }
}

struct DistributionChart<'a> {
    title: String,
    rows: Vec<&'a FrequencyRow>,
}

impl Widget for DistributionChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block = pane(self.title);
        if self.rows.is_empty() {
            let empty = Paragraph::new("No observations")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            Widget::render(empty, area, buf);
            return;
        }

        let chart = BarChart::new(
            self.rows
                .iter()
                .map(|row| {
                    Bar::with_label(row.label.clone(), u64::try_from(row.fi).unwrap_or(u64::MAX))
                        .text_value(format!("{} ({})", row.fi, row.fri_percent))
                })
                .collect::<Vec<_>>(),
        )
        .block(block)
        .direction(Direction::Horizontal)
        .bar_style(Style::default().fg(Color::Cyan))
        .bar_gap(0);
        Widget::render(chart, area, buf);
    }
}

struct FrequencyTable<'a> {
    dimension: Dimension,
    dist: &'a FrequencyDistribution,
}

impl Widget for FrequencyTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let header = Row::new([self.dimension.class_header(), "fi", "fri", "fri%", "Fi%"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let rows = self.dist.iter().map(|row| {
            Row::new([
                row.label.clone(),
                row.fi.to_string(),
                view::format_fri(row),
                row.fri_percent.clone(),
                row.cumulative_percent.clone(),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(9),
                Constraint::Length(9),
            ],
        )
        .header(header)
        .block(pane(format!(
            "Frequency Table: {} (n = {})",
            self.dimension.title(),
            self.dist.total()
        )));
        Widget::render(table, area, buf);
    }
}

/// Splits events into successful and failed `(id, response time)` points.
#[expect(clippy::cast_precision_loss)]
fn scatter_points(events: &[SystemEvent]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for e in events {
        let point = (e.id as f64, f64::from(e.response_time_ms));
        if e.error {
            failed.push(point);
        } else {
            ok.push(point);
        }
    }
    (ok, failed)
}

struct ResponseTimeScatter<'a> {
    events: &'a [SystemEvent],
}

impl Widget for ResponseTimeScatter<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let (ok, failed) = scatter_points(self.events);
        let (x_min, x_max) = ok
            .iter()
            .chain(&failed)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
                (lo.min(x), hi.max(x))
            });
        let x_bounds = if x_min < x_max { [x_min, x_max] } else { [0.0, 1.0] };
        let y_max = ok
            .iter()
            .chain(&failed)
            .map(|&(_, y)| y)
            .max_by(f64::total_cmp)
            .unwrap_or(1.0);
        let y_bounds = [0.0, y_max.max(1.0)];

        let datasets = vec![
            Dataset::default()
                .name("ok")
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Cyan))
                .data(&ok),
            Dataset::default()
                .name("failed")
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Red))
                .data(&failed),
        ];
        let x_axis = Axis::default()
            .title("Event")
            .bounds(x_bounds)
            .labels([
                format!("{:.0}", x_bounds[0]),
                format!("{:.0}", f64::midpoint(x_bounds[0], x_bounds[1])),
                format!("{:.0}", x_bounds[1]),
            ]);
        let y_axis = Axis::default()
            .title("ms")
            .bounds(y_bounds)
            .labels([
                "0".to_owned(),
                format!("{:.0}", y_bounds[1] / 2.0),
                format!("{:.0}", y_bounds[1]),
            ]);
        let chart = Chart::new(datasets)
            .block(pane("Response Time per Event"))
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(Some(LegendPosition::TopRight));

        Widget::render(chart, area, buf);
    }
}

struct EventTable<'a> {
    events: &'a [SystemEvent],
    offset: usize,
}

impl Widget for EventTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let header = Row::new(["ID", "Time", "Service", "ms", "Status", "Error"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let rows = self.events.iter().skip(self.offset).map(|e| {
            let row = Row::new([
                e.id.to_string(),
                e.timestamp.format("%H:%M:%S%.3f").to_string(),
                e.service.to_string(),
                e.response_time_ms.to_string(),
                e.status_code.to_string(),
                if e.error { "yes" } else { "" }.to_owned(),
            ]);
            if e.error {
                row.style(Style::default().fg(Color::Red))
            } else {
                row
            }
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Length(5),
            ],
        )
        .header(header)
        .block(pane(format!(
            "Events (from #{} of {})",
            (self.offset + 1).min(self.events.len()),
            self.events.len()
        )));
        Widget::render(table, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};
    use sysmetrics_analysis::AnalysisConfig;
    use sysmetrics_events::EventGenerator;

    use super::*;

    fn app() -> DashboardApp {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = EventGenerator::from_seed(5, start).generate(120);
        let analysis = EventAnalysis::new(&events, &AnalysisConfig::default()).unwrap();
        DashboardApp::new(events, analysis)
    }

    fn render(app: &DashboardApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn press(app: &mut DashboardApp, code: KeyCode) {
        app.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_dimension_cycling() {
        let mut app = app();
        assert_eq!(app.dimension(), Dimension::ResponseTimes);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.dimension(), Dimension::Services);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.dimension(), Dimension::ErrorsByService);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.dimension(), Dimension::ResponseTimes);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.dimension(), Dimension::ErrorsByService);
    }

    #[test]
    fn test_histogram_order_toggle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('h'));
        let indices = app
            .chart_rows()
            .iter()
            .map(|row| row.interval.unwrap().index)
            .collect::<Vec<_>>();
        assert_eq!(indices, (0..12).collect::<Vec<_>>());

        press(&mut app, KeyCode::Char('h'));
        let counts = app.chart_rows().iter().map(|row| row.fi).collect::<Vec<_>>();
        assert!(counts.is_sorted_by(|a, b| a >= b));
    }

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = app();
            assert!(!app.should_exit());
            press(&mut app, code);
            assert!(app.should_exit());
        }
    }

    #[test]
    fn test_view_toggle_and_scrolling() {
        let mut app = app();
        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.view, View::Events);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.dimension(), Dimension::ResponseTimes);

        press(&mut app, KeyCode::Up);
        assert_eq!(app.event_offset, 0);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.event_offset, 11);
        for _ in 0..20 {
            press(&mut app, KeyCode::PageDown);
        }
        assert_eq!(app.event_offset, 119);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.event_offset, 109);

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.view, View::Distributions);
    }

    #[test]
    #[expect(clippy::cast_precision_loss)]
    fn test_scatter_points_split_failures() {
        let app = app();
        let (ok, failed) = scatter_points(&app.events);
        assert_eq!(failed.len(), app.analysis.total_errors);
        assert_eq!(ok.len() + failed.len(), app.events.len());
        let failed_event = app.events.iter().find(|e| e.error).unwrap();
        assert!(failed.contains(&(
            failed_event.id as f64,
            f64::from(failed_event.response_time_ms)
        )));
    }

    #[test]
    fn test_draw_events_view() {
        let mut app = app();
        press(&mut app, KeyCode::Char('v'));
        let screen = render(&app);
        assert!(screen.contains("Response Time per Event"));
        assert!(screen.contains("Events (from #1 of 120)"));
        assert!(screen.contains("auth-service") || screen.contains("alert-service"));

        press(&mut app, KeyCode::PageDown);
        assert!(render(&app).contains("Events (from #11 of 120)"));
    }

    #[test]
    fn test_draw_every_dimension() {
        let mut app = app();
        for dimension in Dimension::ALL {
            let screen = render(&app);
            assert!(screen.contains("Summary"));
            assert!(screen.contains(dimension.title()), "{}", dimension.title());
            press(&mut app, KeyCode::Right);
        }
    }
}
