use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::Occasion;
use crate::tui::theme;

/// Occasion banners currently up. Renders an empty surface when none are.
pub fn render(frame: &mut Frame, area: Rect, visible: &[Occasion]) {
    let block = Block::default()
        .title(Span::styled(" Occasions ", theme::lamp()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if visible.is_empty() {
            theme::frame()
        } else {
            theme::occasion()
        })
        .style(theme::panel());

    let mut lines = Vec::new();
    if visible.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("No occasion tonight", theme::muted())));
    }
    for occasion in visible {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("✦ ", theme::lamp()),
            Span::styled(
                occasion.display_name(),
                theme::occasion().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", occasion.urdu_name()), theme::occasion()),
        ]));
        lines.push(Line::from(Span::styled(occasion.reminder(), theme::muted())));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
