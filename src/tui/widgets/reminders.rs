use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::models::Reminder;
use crate::tui::theme;

/// Toast for reminders that just fired, anchored bottom-right.
pub fn render(frame: &mut Frame, area: Rect, fired: &[Reminder]) {
    if fired.is_empty() {
        return;
    }
    let width = (area.width / 2).max(30).min(area.width);
    let height = (fired.len() as u16 * 3 + 2).min(area.height);
    let popup = Rect {
        x: area.x + area.width - width,
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let mut lines = Vec::new();
    for r in fired {
        lines.push(Line::from(Span::styled(
            r.title.as_str(),
            theme::lamp().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(r.body.as_str(), theme::muted())));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(Span::styled(" Reminder ", theme::lamp()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::dusk())
        .style(theme::panel());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}
