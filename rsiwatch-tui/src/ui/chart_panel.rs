//! Chart panel — close price with a projected continuation, RSI with
//! threshold lines, and volume.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType};
use ratatui::Frame;

use rsiwatch_core::analysis::{project_prices, PROJECTION_STEPS};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(report) = &app.report else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::muted())
            .title(" No data ");
        f.render_widget(block, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
        ])
        .split(area);

    let closes: Vec<(f64, f64)> = report
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.candle.close))
        .collect();
    let rsi: Vec<(f64, f64)> = report
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.rsi))
        .collect();
    let volume: Vec<(f64, f64)> = report
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.candle.volume))
        .collect();

    // Projected continuation of the close series, anchored on the last row.
    let last_index = report.rows.len().saturating_sub(1) as f64;
    let forecast: Vec<(f64, f64)> =
        project_prices(report.reading.price, report.reading.signal, PROJECTION_STEPS)
            .into_iter()
            .enumerate()
            .map(|(k, price)| (last_index + k as f64, price))
            .collect();

    let n = report.rows.len() as f64;
    render_price(f, chunks[0], &report.symbol, &closes, &forecast, n);
    render_rsi(f, chunks[1], app, &rsi, n);
    render_volume(f, chunks[2], &volume, n);
}

fn value_bounds(data: &[(f64, f64)]) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &(_, y) in data {
        min = min.min(y);
        max = max.max(y);
    }
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    // Pad so a flat series still renders mid-chart.
    let pad = ((max - min) * 0.05).max(max.abs() * 0.001).max(1e-9);
    [min - pad, max + pad]
}

fn render_price(
    f: &mut Frame,
    area: Rect,
    symbol: &str,
    closes: &[(f64, f64)],
    forecast: &[(f64, f64)],
    n: f64,
) {
    // Bounds cover both the history and the projected tail.
    let all: Vec<(f64, f64)> = closes.iter().chain(forecast).copied().collect();
    let bounds = value_bounds(&all);
    let datasets = vec![
        Dataset::default()
            .name("close")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme::positive())
            .data(closes),
        Dataset::default()
            .name("forecast")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(theme::forecast())
            .data(forecast),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(format!(" Close price — {symbol} ")),
        )
        .x_axis(Axis::default().bounds([0.0, (n + PROJECTION_STEPS as f64).max(1.0)]))
        .y_axis(
            Axis::default()
                .bounds(bounds)
                .labels(vec![
                    Span::styled(format!("{:.2}", bounds[0]), theme::muted()),
                    Span::styled(format!("{:.2}", bounds[1]), theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_rsi(f: &mut Frame, area: Rect, app: &AppState, rsi: &[(f64, f64)], n: f64) {
    // Threshold guide lines as flat datasets.
    let oversold_line: Vec<(f64, f64)> = (0..=n as usize).map(|i| (i as f64, app.oversold)).collect();
    let overbought_line: Vec<(f64, f64)> =
        (0..=n as usize).map(|i| (i as f64, app.overbought)).collect();

    let datasets = vec![
        Dataset::default()
            .name("oversold")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(theme::positive())
            .data(&oversold_line),
        Dataset::default()
            .name("overbought")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(theme::negative())
            .data(&overbought_line),
        Dataset::default()
            .name("rsi")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme::accent())
            .data(rsi),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(" RSI "),
        )
        .x_axis(Axis::default().bounds([0.0, n.max(1.0)]))
        .y_axis(
            Axis::default()
                .bounds([0.0, 100.0])
                .labels(vec![
                    Span::styled("0", theme::muted()),
                    Span::styled("50", theme::muted()),
                    Span::styled("100", theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_volume(f: &mut Frame, area: Rect, volume: &[(f64, f64)], n: f64) {
    let bounds = value_bounds(volume);
    let datasets = vec![Dataset::default()
        .name("volume")
        .marker(symbols::Marker::Bar)
        .graph_type(GraphType::Scatter)
        .style(theme::volume())
        .data(volume)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(" Volume "),
        )
        .x_axis(Axis::default().bounds([0.0, n.max(1.0)]))
        .y_axis(Axis::default().bounds([0.0, bounds[1]]));
    f.render_widget(chart, area);
}
