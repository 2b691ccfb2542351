//! Trades panel — the backtest's trade ledger as a table.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use rsiwatch_core::domain::TradeSide;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(backtest) = &app.backtest else {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No trades yet — run an analysis first.",
                theme::muted(),
            ))),
            area,
        );
        return;
    };

    if backtest.trades.is_empty() {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "The strategy produced no trades on this series.",
                theme::muted(),
            ))),
            area,
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Side"),
        Cell::from("Price"),
        Cell::from("Quantity"),
        Cell::from("Cash after"),
    ])
    .style(theme::accent());

    // Keep the most recent fills visible when the ledger outgrows the panel.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = backtest.trades.len().saturating_sub(visible.max(1));

    let rows: Vec<Row> = backtest
        .trades
        .iter()
        .skip(skip)
        .map(|trade| {
            let side_style = match trade.side {
                TradeSide::Buy => theme::positive(),
                TradeSide::Sell => theme::negative(),
            };
            Row::new(vec![
                Cell::from(trade.timestamp.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(Span::styled(trade.side.to_string(), side_style)),
                Cell::from(format!("{:.2}", trade.price)),
                Cell::from(format!("{:.6}", trade.quantity)),
                Cell::from(format!("{:.2}", trade.balance_after)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(12),
        ],
    )
    .header(header);

    f.render_widget(table, area);
}
