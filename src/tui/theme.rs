use ratatui::style::{Color, Modifier, Style};

// Night-sky board: deep indigo ground, lamp-gold for the active prayer,
// emerald for occasion banners.
pub const NIGHT: Color = Color::Rgb(12, 18, 30);
pub const PANEL: Color = Color::Rgb(20, 28, 44);
pub const FRAME: Color = Color::Rgb(48, 64, 92);
pub const INK: Color = Color::Rgb(226, 232, 240);
pub const MUTED: Color = Color::Rgb(120, 136, 160);
pub const LAMP: Color = Color::Rgb(212, 175, 55);
pub const EMERALD: Color = Color::Rgb(46, 160, 110);
pub const DUSK: Color = Color::Rgb(232, 140, 70);
pub const ALERT: Color = Color::Rgb(200, 70, 70);

pub fn base() -> Style {
    Style::default().fg(INK).bg(NIGHT)
}

pub fn panel() -> Style {
    Style::default().fg(INK).bg(PANEL)
}

pub fn frame() -> Style {
    Style::default().fg(FRAME)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn strong() -> Style {
    Style::default().fg(INK).add_modifier(Modifier::BOLD)
}

/// Active prayer, countdown digits, headings.
pub fn lamp() -> Style {
    Style::default().fg(LAMP)
}

pub fn occasion() -> Style {
    Style::default().fg(EMERALD)
}

/// Stale data, reminders, Hijri date.
pub fn dusk() -> Style {
    Style::default().fg(DUSK)
}

pub fn alert() -> Style {
    Style::default().fg(ALERT)
}
