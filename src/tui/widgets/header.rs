use chrono::DateTime;
use chrono_tz::Tz;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, masjid: &str, hijri: Option<&str>, now: &DateTime<Tz>) {
    let gregorian_str = now.format("%A, %b %d, %Y").to_string();
    let clock_str = now.format("%H:%M:%S").to_string();

    let title_line = Line::from(vec![
        Span::styled("  مِحْرَاب  ", theme::lamp().add_modifier(Modifier::BOLD)),
        Span::styled(masjid, theme::lamp()),
    ]);

    let date_line = Line::from(vec![
        Span::styled(hijri.unwrap_or("—"), theme::dusk()),
        Span::styled("  ·  ", theme::muted()),
        Span::styled(gregorian_str, theme::muted()),
        Span::styled("  ·  ", theme::muted()),
        Span::styled(clock_str, theme::strong()),
    ]);

    let text = vec![title_line, Line::from(""), date_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::lamp().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
