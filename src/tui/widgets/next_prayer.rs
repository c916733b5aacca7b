use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::models::NextPrayerCandidate;
use crate::tui::theme;
use crate::utils::format::format_countdown;

/// What the countdown panel has to show.
pub enum Countdown<'a> {
    /// No timings yet and the first fetch is still running.
    Loading,
    /// No timings and the last fetch failed.
    Failed(&'a str),
    Running {
        next: &'a NextPrayerCandidate,
        remaining: i64,
    },
}

pub fn render(frame: &mut Frame, area: Rect, state: Countdown<'_>) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::lamp()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::frame())
        .style(theme::panel());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (next, remaining) = match state {
        Countdown::Loading => {
            let p = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled("Loading prayer times…", theme::muted())),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(p, inner);
            return;
        }
        Countdown::Failed(reason) => {
            let p = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled("✗ Could not load prayer times", theme::alert())),
                Line::from(Span::styled(reason, theme::muted())),
                Line::from(""),
                Line::from(Span::styled("[r] retry", theme::lamp())),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(p, inner);
            return;
        }
        Countdown::Running { next, remaining } => (next, remaining),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // name
            Constraint::Length(4), // big countdown
            Constraint::Min(0),
        ])
        .split(inner);

    let when = if next.tomorrow { "  tomorrow" } else { "" };
    let title = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                next.prayer.display_name().to_uppercase(),
                theme::lamp().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", next.prayer.urdu_name()), theme::lamp()),
        ]),
        Line::from(Span::styled(
            format!("at {}{}", next.display_time(), when),
            theme::muted(),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let text = format_countdown(remaining);
    // Quadrant glyphs are 4 columns per character.
    let width = (text.chars().count() as u16 * 4).min(chunks[1].width);
    let centered = Rect {
        x: chunks[1].x + (chunks[1].width - width) / 2,
        width,
        ..chunks[1]
    };
    let big = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(theme::dusk().add_modifier(Modifier::BOLD))
        .lines(vec![Line::from(text)])
        .build();
    frame.render_widget(big, centered);
}
