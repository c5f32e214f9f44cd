//! Ratatui-based terminal UI.
//!
//! The TUI runs the same fit pipeline as `lut fit`, then lets you walk through
//! the fitted groups with the arrow keys, toggle the polynomial degree, and
//! switch the value column without re-launching the tool.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{run_fit, run_fit_with_rows, RunOutput};
use crate::domain::{FitConfig, GroupFit, GroupSeries, ValueColumn};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::LutPlottersChart;

/// Start the TUI.
pub fn run(config: FitConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config)?;
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
    config: FitConfig,
    run: RunOutput,
    selected: usize,
    status: String,
}

impl App {
    fn new(config: FitConfig) -> Result<Self, AppError> {
        let run = run_fit(&config)?;
        let status = format!(
            "{} groups fitted ({} skipped) from '{}'.",
            run.fit_set.fits.len(),
            run.fit_set.skipped.len(),
            config.csv_path.display()
        );
        Ok(Self {
            config,
            run,
            selected: 0,
            status,
        })
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Left => {
                self.step_selection(-1);
            }
            KeyCode::Right => {
                self.step_selection(1);
            }
            KeyCode::Char('d') => {
                self.config.degree = self.config.degree.toggled();
                self.refit()?;
                self.status = format!("degree: {}", self.config.degree.display_name());
            }
            KeyCode::Char('v') => {
                self.config.value = next_value_column(self.config.value);
                self.reload()?;
                self.status = format!("value: {}", self.config.value.display_name());
            }
            KeyCode::Char('b') => match crate::debug::write_debug_bundle(&self.run, &self.config) {
                Ok(path) => {
                    self.status = format!("Wrote debug bundle: {}", path.display());
                }
                Err(err) => {
                    self.status = format!("Debug write failed: {err}");
                }
            },
            _ => {}
        }

        Ok(false)
    }

    fn step_selection(&mut self, delta: i64) {
        let n = self.run.fit_set.fits.len();
        if n == 0 {
            return;
        }
        let cur = self.selected as i64;
        self.selected = (cur + delta).rem_euclid(n as i64) as usize;
        if let Some(fit) = self.run.fit_set.fits.get(self.selected) {
            self.status = format!("key: {}", fit.key);
        }
    }

    /// Refit the current rows with the (changed) degree, keeping the ingest.
    fn refit(&mut self) -> Result<(), AppError> {
        let key = self.selected_key();
        self.run = run_fit_with_rows(&self.config, self.run.ingest.clone())?;
        self.restore_selection(key);
        Ok(())
    }

    /// Reload from the CSV. Needed after a value-column change because the
    /// ingest stats follow the value column the rows were loaded with.
    fn reload(&mut self) -> Result<(), AppError> {
        let key = self.selected_key();
        self.run = run_fit(&self.config)?;
        self.restore_selection(key);
        Ok(())
    }

    fn selected_key(&self) -> Option<i64> {
        self.run.fit_set.fits.get(self.selected).map(|f| f.key)
    }

    fn restore_selection(&mut self, key: Option<i64>) {
        self.selected = key
            .and_then(|k| self.run.fit_set.fits.iter().position(|f| f.key == k))
            .unwrap_or(0);
    }

    fn selected_fit(&self) -> Option<&GroupFit> {
        self.run.fit_set.fits.get(self.selected)
    }

    fn selected_series(&self) -> Option<&GroupSeries> {
        let fit = self.selected_fit()?;
        self.run.group_set.groups.iter().find(|g| g.key == fit.key)
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
            Span::styled("lut", Style::default().fg(Color::Cyan)),
            Span::raw(" — lookup-table curve fits"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "value: {} | group by {} | degree: {} | groups: {} fitted / {} skipped",
                self.config.value.display_name(),
                self.config.group.display_name(),
                self.config.degree.display_name(),
                self.run.fit_set.fits.len(),
                self.run.fit_set.skipped.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(fit) = self.selected_fit() {
            lines.push(Line::from(Span::styled(
                format!(
                    "key={} | n={} | rmse={:.6} | sse={:.6}",
                    fit.key, fit.quality.n, fit.quality.rmse, fit.quality.sse,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_groups(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.selected_fit() {
            Some(fit) => format!("Group key={}", fit.key),
            None => "Group".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (Some(fit), Some(series)) = (self.selected_fit(), self.selected_series()) else {
            let msg = Paragraph::new("No fitted group to display.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (curve, points, x_bounds, y_bounds) = chart_series(series, fit);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = LutPlottersChart {
            curve: &curve,
            points: &points,
            x_bounds,
            y_bounds,
            x_label: "time (days)",
            y_label: self.config.value.display_name().to_string(),
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(
                frame,
                inner,
                chart_rect,
                insets,
                x_bounds,
                y_bounds,
                self.config.value.display_name(),
            );
        }
    }

    fn draw_groups(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .run
            .fit_set
            .fits
            .iter()
            .map(|fit| {
                ListItem::new(format!(
                    "key={:<6} n={:<5} rmse={:.6}",
                    fit.key, fit.quality.n, fit.quality.rmse
                ))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Groups").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ group  d degree  v value  b debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series for Plotters.
fn chart_series(
    series: &GroupSeries,
    fit: &GroupFit,
) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let mut t0 = series.times.first().copied().unwrap_or(0.0);
    let mut t1 = series.times.last().copied().unwrap_or(1.0);
    if !t0.is_finite() || !t1.is_finite() || t1 <= t0 {
        t0 = 0.0;
        t1 = 1.0;
    }
    let x_bounds = [t0, t1];

    let points: Vec<(f64, f64)> = series
        .times
        .iter()
        .copied()
        .zip(series.values.iter().copied())
        .collect();

    let n = 200usize;
    let mut curve = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let t = t0 + u * (t1 - t0);
        curve.push((t, crate::models::predict(&fit.model.coeffs, t)));
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in &points {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    for &(_, y) in &curve {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    (curve, points, x_bounds, y_bounds)
}

fn next_value_column(cur: ValueColumn) -> ValueColumn {
    match cur {
        ValueColumn::Aa => ValueColumn::Ab,
        ValueColumn::Ab => ValueColumn::Ba,
        ValueColumn::Ba => ValueColumn::Bb,
        ValueColumn::Bb => ValueColumn::Ratio,
        ValueColumn::Ratio => ValueColumn::Aa,
    }
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.2}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

#[allow(clippy::too_many_arguments)]
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.0}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.2}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("time (days)")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Degree, FitQuality, PolyModel};

    #[test]
    fn chart_series_spans_group_range() {
        let series = GroupSeries {
            key: 3,
            times: vec![10.0, 20.0, 30.0],
            values: vec![1.0, 2.0, 3.0],
        };
        let fit = GroupFit {
            key: 3,
            model: PolyModel {
                degree: Degree::Quadratic,
                coeffs: vec![0.0, 0.1, 0.0],
            },
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                n: 3,
            },
            std_errors: vec![],
        };

        let (curve, points, x_bounds, y_bounds) = chart_series(&series, &fit);
        assert_eq!(points.len(), 3);
        assert_eq!(curve.len(), 200);
        assert_eq!(x_bounds, [10.0, 30.0]);
        assert!(y_bounds[0] < 1.0 && y_bounds[1] > 3.0);
    }

    #[test]
    fn value_columns_cycle() {
        let mut col = ValueColumn::Aa;
        for _ in 0..5 {
            col = next_value_column(col);
        }
        assert_eq!(col, ValueColumn::Aa);
    }
}
