//! Ratatui-based terminal UI.
//!
//! The TUI shows the budget / actual / projected chart with a settings panel for
//! the budget, the period-end target, how many actual days are used, and the
//! accumulation mode. Pipeline failures render an empty chart with the error
//! instead of leaving the UI.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{RunOutput, load_actuals, run_projection};
use crate::config::Settings;
use crate::domain::{ActualPoint, KpiConfig, MergedPoint, SampleKind};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::KpiPlottersChart;

const FIELD_COUNT: usize = 4;
const VALUE_STEP: f64 = 0.5;

/// Start the TUI.
pub fn run(config: KpiConfig, settings: Settings) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, settings);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: KpiConfig,
    settings: Settings,
    /// Full actual series from the configured source.
    base: Vec<ActualPoint>,
    /// How many leading actual days feed the projection.
    cutoff: usize,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
    error: Option<String>,
}

impl App {
    fn new(config: KpiConfig, settings: Settings) -> Self {
        let mut app = Self {
            config,
            settings,
            base: Vec::new(),
            cutoff: 0,
            selected_field: 0,
            status: String::new(),
            run: None,
            error: None,
        };
        app.reload_source();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('a') => {
                self.config.accumulation = self.config.accumulation.toggle();
                self.recompute();
                self.status = format!("accumulation: {}", self.config.accumulation.label());
                self.track("toggle_accumulation");
            }
            KeyCode::Char('p') => {
                self.config.projected = None;
                self.recompute();
                self.status = "projected: run-rate".to_string();
                self.track("reset_projected");
            }
            KeyCode::Char('s') => {
                if self.config.input.is_some() {
                    self.status = "Sample switching is disabled with a CSV input.".to_string();
                } else {
                    self.config.sample.kind = match self.config.sample.kind {
                        SampleKind::Reference => SampleKind::Synthetic,
                        SampleKind::Synthetic => SampleKind::Reference,
                    };
                    self.reload_source();
                    self.track("switch_sample");
                }
            }
            KeyCode::Char('r') => {
                if self.config.input.is_none() && self.config.sample.kind == SampleKind::Synthetic {
                    self.config.sample.seed = self.config.sample.seed.wrapping_add(1);
                    self.reload_source();
                    self.status = format!("Resampled (seed {}).", self.config.sample.seed);
                } else {
                    self.reload_source();
                }
                self.track("reload");
            }
            _ => {}
        }

        false
    }

    fn adjust_field(&mut self, delta: i32) {
        let sign = if delta >= 0 { 1.0 } else { -1.0 };
        match self.selected_field {
            0 => {
                self.config.budget += sign * VALUE_STEP;
                self.recompute();
                self.status = format!("budget: {:.2}", self.config.budget);
            }
            1 => {
                let current = self
                    .config
                    .projected
                    .or_else(|| self.run.as_ref().map(|r| r.summary.projected))
                    .unwrap_or(self.config.budget);
                self.config.projected = Some(current + sign * VALUE_STEP);
                self.recompute();
                self.status = format!("projected: {:.2}", current + sign * VALUE_STEP);
            }
            2 => {
                self.cutoff = if delta >= 0 {
                    (self.cutoff + 1).min(self.base.len())
                } else {
                    self.cutoff.saturating_sub(1).max(self.base.len().min(1))
                };
                self.recompute();
                self.status = format!("actual days: {}/{}", self.cutoff, self.base.len());
            }
            3 => {
                self.config.accumulation = self.config.accumulation.toggle();
                self.recompute();
                self.status = format!("accumulation: {}", self.config.accumulation.label());
            }
            _ => {}
        }
        self.track("adjust_setting");
    }

    fn reload_source(&mut self) {
        match load_actuals(&self.config) {
            Ok(points) => {
                self.cutoff = points.len();
                self.base = points;
                self.status = format!("Loaded {}.", crate::app::source_label(&self.config));
            }
            Err(err) => {
                self.base.clear();
                self.cutoff = 0;
                self.status = format!("Load failed: {err}");
            }
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        let actual: Vec<ActualPoint> = self.base.iter().take(self.cutoff).copied().collect();
        match run_projection(
            actual,
            self.config.budget,
            self.config.projected,
            self.config.accumulation,
        ) {
            Ok(run) => {
                self.run = Some(run);
                self.error = None;
            }
            Err(err) => {
                self.run = None;
                self.error = Some(err.to_string());
            }
        }
    }

    fn track(&self, event: &str) {
        if self.settings.analytics_enabled {
            tracing::info!(
                event,
                environment = self.settings.environment.as_str(),
                field = self.selected_field,
                "tui usage"
            );
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("kpi", Style::default().fg(Color::Cyan)),
            Span::raw(" - freight spend vs budget"),
            Span::styled(
                format!(" [{}]", self.settings.environment.as_str()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        match &self.run {
            Some(run) => {
                let s = &run.summary;
                lines.push(Line::from(Span::styled(
                    format!(
                        "period: {} .. {} | last actual: {:.2} on {} | remaining: {}d",
                        s.period_start, s.period_end, s.last_actual, s.last_actual_date, s.days_remaining
                    ),
                    Style::default().fg(Color::Gray),
                )));
                let status_color = match s.status {
                    crate::domain::BudgetStatus::OverBudget => Color::Red,
                    crate::domain::BudgetStatus::OnBudget => Color::Yellow,
                    crate::domain::BudgetStatus::UnderBudget => Color::Green,
                };
                lines.push(Line::from(Span::styled(
                    format!(
                        "budget: {:.2} | projected: {:.2} | variance: {:+.2} ({})",
                        s.budget,
                        s.projected,
                        s.variance,
                        s.status.display_name()
                    ),
                    Style::default().fg(status_color),
                )));
            }
            None => {
                lines.push(Line::from(Span::styled(
                    "no projection",
                    Style::default().fg(Color::Gray),
                )));
            }
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Freight spend: actual (cyan) / budget (yellow) / projected (magenta)")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let reason = self.error.as_deref().unwrap_or("no data");
            let msg = Paragraph::new(format!("No chart: {reason}"))
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let series = chart_series(&run.merged);
        let widget = KpiPlottersChart {
            actual: &series.actual,
            budget: &series.budget,
            projected: &series.projected,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "day",
            y_label: "spend",
            fmt_x: fmt_axis_day,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let projected = match self.config.projected {
            Some(v) => format!("{v:.2}"),
            None => "run-rate".to_string(),
        };

        let items = vec![
            ListItem::new(format!("Budget: {:.2}", self.config.budget)),
            ListItem::new(format!("Projected: {projected}")),
            ListItem::new(format!("Actual days: {}/{}", self.cutoff, self.base.len())),
            ListItem::new(format!("Accumulation: {}", self.config.accumulation.label())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  a accumulation  p run-rate  s sample  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                &self.status,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Plot-ready channels with x = 1-based day of the merged period.
#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    actual: Vec<(f64, f64)>,
    budget: Vec<(f64, f64)>,
    projected: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(merged: &[MergedPoint]) -> ChartSeries {
    let start = merged.first().map(|p| p.date);
    let x_of = |p: &MergedPoint| {
        start
            .map(|s| (p.date - s).num_days() as f64 + 1.0)
            .unwrap_or(1.0)
    };

    let mut actual = Vec::new();
    let mut budget = Vec::new();
    let mut projected = Vec::new();
    for p in merged {
        let x = x_of(p);
        if let Some(v) = p.actual {
            actual.push((x, v));
        }
        if let Some(v) = p.budget {
            budget.push((x, v));
        }
        if let Some(v) = p.projected {
            projected.push((x, v));
        }
    }

    let x_max = merged.last().map(x_of).unwrap_or(1.0).max(2.0);
    let x_bounds = [1.0, x_max];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in actual.iter().chain(&budget).chain(&projected) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    ChartSeries {
        actual,
        budget,
        projected,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    }
}

fn fmt_axis_day(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ratatui::backend::TestBackend;

    use crate::config::Environment;
    use crate::data::reference_series;
    use crate::projection::merge;

    fn app_with(args: &[&str]) -> App {
        let cli = crate::cli::Cli::parse_from(args.iter().copied());
        let crate::cli::Command::Tui(chart_args) = cli.command else {
            panic!("expected tui");
        };
        let settings = Settings {
            environment: Environment::Development,
            log_filter: None,
            analytics_enabled: false,
        };
        App::new(crate::app::kpi_config_from_args(&chart_args), settings)
    }

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn missing_csv_keeps_the_ui_alive() {
        let mut app = app_with(&["kpi", "tui", "--input", "/nonexistent/kpi-actuals.csv"]);
        assert!(app.run.is_none());
        assert!(app.error.is_some());
        assert!(app.status.starts_with("Load failed"), "{}", app.status);

        app.selected_field = 2;
        app.adjust_field(-1);
        assert_eq!(app.cutoff, 0);
        assert_eq!(app.status, "actual days: 0/0");
        assert!(app.run.is_none());
        assert_eq!(app.error.as_deref(), Some("invalid input: actual series is empty"));

        assert!(rendered(&mut app).contains("No chart: invalid input"));
    }

    #[test]
    fn actual_days_stay_within_the_loaded_series() {
        let mut app = app_with(&["kpi", "tui", "-b", "20", "-p", "22"]);
        assert_eq!(app.cutoff, 15);
        assert!(app.run.is_some());

        app.selected_field = 2;
        app.adjust_field(1);
        assert_eq!(app.cutoff, 15);
        for _ in 0..20 {
            app.adjust_field(-1);
        }
        assert_eq!(app.cutoff, 1);
        let run = app.run.as_ref().unwrap();
        assert_eq!(run.summary.days_elapsed, 1);
        assert_eq!(run.merged.len(), 31);
        assert!(app.error.is_none());
    }

    #[test]
    fn chart_series_splits_channels() {
        let merged = merge(&reference_series(), 20.0, 22.0).unwrap();
        let s = chart_series(&merged);

        assert_eq!(s.actual.len(), 15);
        assert_eq!(s.budget.len(), 31);
        assert_eq!(s.projected.len(), 17);
        assert_eq!(s.projected[0], (15.0, 10.8));
        assert_eq!(s.x_bounds, [1.0, 31.0]);
        assert!(s.y_bounds[0] < 1.2 && s.y_bounds[1] > 22.0);
    }

    #[test]
    fn chart_series_handles_empty_input() {
        let s = chart_series(&[]);
        assert!(s.actual.is_empty());
        assert_eq!(s.x_bounds, [1.0, 2.0]);
        assert!(s.y_bounds[1] > s.y_bounds[0]);
    }
}
