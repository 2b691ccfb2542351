//! Dark theme tokens — the dashboard keeps the original's dark, minimalist
//! look: light text on near-black, green for buys, red for sells.

use ratatui::style::{Color, Modifier, Style};

pub fn accent() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn positive() -> Style {
    Style::default().fg(Color::Green)
}

pub fn negative() -> Style {
    Style::default().fg(Color::Red)
}

pub fn warning() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn volume() -> Style {
    Style::default().fg(Color::Rgb(255, 165, 0))
}

pub fn forecast() -> Style {
    Style::default().fg(Color::Magenta)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent().add_modifier(Modifier::BOLD)
    } else {
        muted()
    }
}

pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}
