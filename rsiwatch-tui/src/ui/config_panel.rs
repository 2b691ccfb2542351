//! Config panel — analysis inputs: pair, interval, thresholds, capital.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, ConfigField};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines = vec![Line::from(Span::styled(
        "Strategy parameters",
        theme::accent(),
    ))];
    lines.push(Line::raw(""));

    for field in ConfigField::ALL {
        let value = match field {
            ConfigField::Symbol => app.symbol.clone(),
            ConfigField::Timeframe => app.timeframe.to_string(),
            ConfigField::Oversold => format!("{:.0}", app.oversold),
            ConfigField::Overbought => format!("{:.0}", app.overbought),
            ConfigField::Capital => format!("{:.2}", app.capital),
        };

        let style = if field == app.selected_field {
            theme::selected()
        } else {
            theme::accent()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("  {:<24}", field.label()), theme::muted()),
            Span::styled(value, style),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        format!(
            "  Buy: RSI < {:.0}   Sell: RSI > {:.0}",
            app.oversold, app.overbought
        ),
        theme::muted(),
    )));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "  ↑/↓ select field   ←/→ adjust   type to edit pair   Enter run",
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines), area);
}
