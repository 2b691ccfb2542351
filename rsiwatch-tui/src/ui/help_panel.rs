//! Help panel — keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::theme;

pub fn render(f: &mut Frame, area: Rect) {
    let entries: &[(&str, &str)] = &[
        ("1-5 / Tab", "switch panel"),
        ("↑/↓", "select config field"),
        ("←/→", "adjust selected value"),
        ("typing", "edit the pair (Config panel)"),
        ("Enter", "run the analysis"),
        ("r", "refresh with current inputs"),
        ("q / Esc", "quit"),
    ];

    let mut lines = vec![
        Line::from(Span::styled("Keyboard shortcuts", theme::accent())),
        Line::raw(""),
    ];
    for (keys, action) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {keys:<12}"), theme::accent()),
            Span::styled(*action, theme::muted()),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "  Signals: STRONG BUY when RSI drops below the oversold cutoff,",
        theme::muted(),
    )));
    lines.push(Line::from(Span::styled(
        "  SELL/CLOSE above the overbought cutoff, NEUTRAL in between.",
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines), area);
}
