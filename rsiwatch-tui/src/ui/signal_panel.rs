//! Signal panel — live reading plus the backtest summary.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use rsiwatch_core::domain::Signal;
use rsiwatch_core::indicators::DEFAULT_RSI_PERIOD;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(5)])
        .split(area);

    render_live(f, chunks[0], app);
    render_backtest(f, chunks[1], app);
}

fn signal_style(signal: Signal) -> ratatui::style::Style {
    match signal {
        Signal::StrongBuy => theme::positive(),
        Signal::SellClose => theme::negative(),
        Signal::Neutral => theme::warning(),
        Signal::Error => theme::negative(),
    }
}

fn render_live(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Live reading ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = match &app.report {
        Some(report) => vec![
            Line::from(vec![
                Span::styled("Pair / interval   ", theme::muted()),
                Span::styled(
                    format!("{} / {}", report.symbol, report.timeframe),
                    theme::accent(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Price             ", theme::muted()),
                Span::styled(format!("${:.2}", report.reading.price), theme::accent()),
            ]),
            Line::from(vec![
                Span::styled(format!("RSI ({DEFAULT_RSI_PERIOD})          "), theme::muted()),
                Span::styled(format!("{:.2}", report.reading.rsi), theme::accent()),
            ]),
            Line::from(vec![
                Span::styled("Signal            ", theme::muted()),
                Span::styled(
                    report.reading.signal.label(),
                    signal_style(report.reading.signal),
                ),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            "No analysis yet — press Enter in the Config panel.",
            theme::muted(),
        ))],
    };

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_backtest(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Backtest ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (Some(report), Some(backtest)) = (&app.report, &app.backtest) else {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled("No backtest yet.", theme::muted()))),
            inner,
        );
        return;
    };

    let total_profit = backtest.total_profit(app.capital);
    let pnl_style = if total_profit < 0.0 {
        theme::negative()
    } else {
        theme::positive()
    };

    let span_hours = report.span_hours();
    let hourly = if span_hours > 0.0 {
        total_profit / span_hours
    } else {
        0.0
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Starting capital  ", theme::muted()),
            Span::styled(format!("${:.2}", app.capital), theme::accent()),
        ]),
        Line::from(vec![
            Span::styled("Final value       ", theme::muted()),
            Span::styled(
                format!("${:.2} ({:+.2}%)", backtest.final_value, backtest.profit_percent),
                pnl_style,
            ),
        ]),
        Line::from(vec![
            Span::styled("Net profit        ", theme::muted()),
            Span::styled(format!("${total_profit:.2}"), pnl_style),
        ]),
        Line::from(vec![
            Span::styled("Trades            ", theme::muted()),
            Span::styled(backtest.trade_count.to_string(), theme::accent()),
        ]),
        Line::from(vec![
            Span::styled("Avg gain / hour   ", theme::muted()),
            Span::styled(
                format!("${hourly:.4} (over {span_hours:.1}h)"),
                theme::accent(),
            ),
        ]),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}
