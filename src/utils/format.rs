use chrono::NaiveTime;
use unicode_width::UnicodeWidthStr;

/// Format a duration in seconds to "Xh Ym" or "Ym" string
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format a countdown as zero-padded "HH:MM:SS"
pub fn format_countdown(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format a NaiveTime to "HH:MM"
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Right-pad to a display width. Urdu and Arabic glyphs do not occupy one
/// column per char, so `format!("{:<n}")` misaligns them.
pub fn pad_display(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_is_zero_padded() {
        assert_eq!(format_countdown(0), "00:00:00");
        assert_eq!(format_countdown(3 * 3600 + 25 * 60 + 7), "03:25:07");
        assert_eq!(format_countdown(-5), "00:00:00");
    }

    #[test]
    fn duration_is_coarse() {
        assert_eq!(format_duration_secs(0), "now");
        assert_eq!(format_duration_secs(59 * 60), "59m");
        assert_eq!(format_duration_secs(2 * 3600 + 5 * 60), "2h 5m");
    }

    #[test]
    fn pads_by_display_width() {
        assert_eq!(pad_display("Asr", 6), "Asr   ");
        assert_eq!(pad_display("Maghrib", 3), "Maghrib");
    }
}
