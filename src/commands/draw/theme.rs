use ratatui::style::{Color, Modifier, Style};

/// Colors for the three step states shown in the admin panel.
pub struct StepColors;

impl StepColors {
    pub const REVEALED: Color = Color::Green;
    pub const UNLOCKED: Color = Color::Cyan;
    pub const LOCKED: Color = Color::DarkGray;
}

/// Theme for the draw screen.
pub struct Theme;

impl Theme {
    pub fn header() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn card_title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_rolling() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn banner() -> Style {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn revealed() -> Style {
        Style::default().fg(StepColors::REVEALED)
    }

    pub fn unlocked() -> Style {
        Style::default().fg(StepColors::UNLOCKED)
    }

    pub fn locked() -> Style {
        Style::default().fg(StepColors::LOCKED)
    }

    pub fn selected() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub fn key_hint() -> Style {
        Style::default().fg(Color::DarkGray)
    }
}
