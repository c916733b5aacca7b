use chrono::NaiveTime;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{DailyTimings, PrayerName};
use crate::tui::theme;
use crate::utils::format::{format_time, pad_display};

/// Rows in display order. On Fridays the congregational prayer takes the
/// midday slot.
pub fn rows(timings: &DailyTimings, jummah: NaiveTime) -> Vec<(PrayerName, NaiveTime)> {
    timings
        .schedule()
        .iter()
        .map(|&(p, t)| match p {
            PrayerName::Dhuhr if timings.is_friday() => (PrayerName::Jummah, jummah),
            _ => (p, t),
        })
        .collect()
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    timings: Option<&DailyTimings>,
    jummah: NaiveTime,
    active: Option<PrayerName>,
    now: NaiveTime,
) {
    let block = Block::default()
        .title(Span::styled(" Prayers ", theme::lamp()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::frame())
        .style(theme::panel());

    let Some(timings) = timings else {
        let list = List::new(vec![ListItem::new(Span::styled("  --:--", theme::muted()))])
            .block(block);
        frame.render_widget(list, area);
        return;
    };

    let items: Vec<ListItem> = rows(timings, jummah)
        .into_iter()
        .map(|(prayer, time)| {
            let is_active = Some(prayer) == active;
            let (icon, name_style) = if is_active {
                ("▸", theme::lamp().add_modifier(Modifier::BOLD))
            } else if time <= now {
                (" ", theme::muted())
            } else {
                (" ", theme::strong())
            };

            let line = Line::from(vec![
                Span::styled(format!(" {} ", icon), theme::lamp()),
                Span::styled(format!("{:<9}", prayer.display_name()), name_style),
                Span::styled(pad_display(prayer.urdu_name(), 12), theme::muted()),
                Span::styled(format_time(time), name_style),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timings::fixtures::{friday, thursday, timings_on};

    #[test]
    fn friday_swaps_dhuhr_for_jummah() {
        let jummah = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        let fri = rows(&timings_on(friday(), 7, 3), jummah);
        assert!(fri.contains(&(PrayerName::Jummah, jummah)));
        assert!(!fri.iter().any(|(p, _)| *p == PrayerName::Dhuhr));

        let thu = rows(&timings_on(thursday(), 7, 2), jummah);
        assert!(!thu.iter().any(|(p, _)| *p == PrayerName::Jummah));
        assert_eq!(thu.len(), 6);
    }
}
