use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, note: Option<&str>) {
    let hints = [
        ("[r]", " refresh  "),
        ("[c]", " occasions  "),
        ("[?]", " help  "),
        ("[q]", " quit"),
    ];

    let mut spans = Vec::new();
    if let Some(note) = note {
        spans.push(Span::styled(format!("{}   ", note), theme::dusk()));
    }
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::lamp()));
        spans.push(Span::styled(*label, theme::muted()));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
