use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info};

use crate::config::settings::{Language, ReminderConfig};
use crate::models::{DailyTimings, PrayerName, Reminder, ScheduleMessage};
use crate::utils::time::sanitize_time;

/// Holds the active reminder schedule and decides which entries fire.
///
/// The schedule is replaced wholesale by each `SCHEDULE_NOTIFICATION`
/// message. `due` is meant to be polled about once a minute; a given
/// wall-clock minute only ever fires once, however often it is polled.
#[derive(Debug, Default)]
pub struct NotificationScheduler {
    scheduled: Vec<Reminder>,
    last_fired: Option<NaiveDateTime>,
}

impl NotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, message: ScheduleMessage) {
        match message {
            ScheduleMessage::ScheduleNotification { notifications } => {
                info!("Scheduled {} reminder(s)", notifications.len());
                self.scheduled = notifications;
            }
        }
    }

    pub fn scheduled(&self) -> &[Reminder] {
        &self.scheduled
    }

    /// Reminders whose HH:MM equals the minute containing `now`.
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<Reminder> {
        let Some(minute) = now.with_second(0).and_then(|t| t.with_nanosecond(0)) else {
            return Vec::new();
        };
        if self.last_fired == Some(minute) {
            return Vec::new();
        }

        let current = (minute.hour(), minute.minute());
        let fired: Vec<Reminder> = self
            .scheduled
            .iter()
            .filter(|r| (r.time.hour(), r.time.minute()) == current)
            .cloned()
            .collect();

        if !fired.is_empty() {
            debug!("{} reminder(s) due at {}", fired.len(), minute.format("%H:%M"));
            self.last_fired = Some(minute);
        }
        fired
    }
}

/// Daily Quran and Durood reminders, in the configured language.
pub fn default_reminders(config: &ReminderConfig) -> Result<Vec<Reminder>> {
    let mut out = Vec::new();
    if config.quran_enabled {
        let (title, body) = match config.language {
            Language::En => (
                "📖 Daily Quran Reading",
                "✨ Time to read and reflect on the Quran",
            ),
            Language::Urdu => (
                "📖 روزانہ قرآن کی تلاوت",
                "قرآن کو پڑھنے اور غور و فکر کرنے کا وقت ہے",
            ),
        };
        out.push(Reminder {
            title: title.to_string(),
            body: body.to_string(),
            time: sanitize_time(&config.quran_time).context("Parsing reminders.quran_time")?,
        });
    }
    if config.durood_enabled {
        let (title, body) = match config.language {
            Language::En => (
                "🤲 Durood on Prophet Muhammad",
                "✨ Send blessings upon the Prophet Muhammad (Peace Be Upon Him)",
            ),
            Language::Urdu => (
                "🤲 درود شریف",
                "حضرت محمد صلی اللہ علیہ وسلم پر درود بھیجیں",
            ),
        };
        out.push(Reminder {
            title: title.to_string(),
            body: body.to_string(),
            time: sanitize_time(&config.durood_time).context("Parsing reminders.durood_time")?,
        });
    }
    Ok(out)
}

/// One reminder per obligatory prayer at its start time.
pub fn prayer_reminders(timings: &DailyTimings, language: Language) -> Vec<Reminder> {
    PrayerName::obligatory()
        .into_iter()
        .filter_map(|p| timings.time_of(p).map(|t| (p, t)))
        .map(|(prayer, time)| prayer_reminder(prayer, time, language))
        .collect()
}

fn prayer_reminder(prayer: PrayerName, time: NaiveTime, language: Language) -> Reminder {
    let (title, body) = match language {
        Language::En => {
            let name = prayer.display_name();
            (
                format!("🕌 {} Prayer Time", name),
                format!("It's time for {} prayer", name),
            )
        }
        Language::Urdu => {
            let name = prayer.urdu_name();
            (
                format!("🕌 {} کا وقت", name),
                format!("{} کی نماز کا وقت ہو گیا ہے", name),
            )
        }
    };
    Reminder { title, body, time }
}

/// The full schedule: defaults, then per-prayer reminders when timings are
/// known, then user-defined ones. Empty when reminders are disabled.
pub fn build_schedule(
    config: &ReminderConfig,
    timings: Option<&DailyTimings>,
    custom: &[Reminder],
) -> Result<ScheduleMessage> {
    let mut notifications = Vec::new();
    if config.enabled {
        notifications.extend(default_reminders(config)?);
        if config.prayer_times {
            if let Some(t) = timings {
                notifications.extend(prayer_reminders(t, config.language));
            }
        }
        notifications.extend(custom.iter().cloned());
    }
    Ok(ScheduleMessage::ScheduleNotification { notifications })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timings::fixtures::{timings_on, wednesday};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn reminder(title: &str, h: u32, m: u32) -> Reminder {
        Reminder {
            title: title.into(),
            body: String::new(),
            time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
        }
    }

    #[test]
    fn fires_on_matching_minute_only_once() {
        let mut s = NotificationScheduler::new();
        s.apply(ScheduleMessage::ScheduleNotification {
            notifications: vec![reminder("Quran", 7, 0), reminder("Durood", 18, 0)],
        });

        assert!(s.due(at(6, 59, 59)).is_empty());
        let fired = s.due(at(7, 0, 5));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].title, "Quran");
        assert!(s.due(at(7, 0, 50)).is_empty());
        assert!(s.due(at(7, 1, 0)).is_empty());
    }

    #[test]
    fn fires_again_the_next_day() {
        let mut s = NotificationScheduler::new();
        s.apply(ScheduleMessage::ScheduleNotification {
            notifications: vec![reminder("Quran", 7, 0)],
        });
        assert_eq!(s.due(at(7, 0, 0)).len(), 1);
        let tomorrow = at(7, 0, 0) + chrono::Duration::days(1);
        assert_eq!(s.due(tomorrow).len(), 1);
    }

    #[test]
    fn apply_replaces_previous_schedule() {
        let mut s = NotificationScheduler::new();
        s.apply(ScheduleMessage::ScheduleNotification {
            notifications: vec![reminder("Quran", 7, 0)],
        });
        s.apply(ScheduleMessage::ScheduleNotification {
            notifications: vec![reminder("Durood", 18, 0)],
        });
        assert_eq!(s.scheduled().len(), 1);
        assert!(s.due(at(7, 0, 0)).is_empty());
        assert_eq!(s.due(at(18, 0, 0)).len(), 1);
    }

    #[test]
    fn defaults_follow_language() {
        let mut config = ReminderConfig::default();
        let en = default_reminders(&config).unwrap();
        assert_eq!(en.len(), 2);
        assert_eq!(en[0].title, "📖 Daily Quran Reading");
        assert_eq!(en[0].time, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(en[1].time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());

        config.language = Language::Urdu;
        config.durood_enabled = false;
        let ur = default_reminders(&config).unwrap();
        assert_eq!(ur.len(), 1);
        assert_eq!(ur[0].title, "📖 روزانہ قرآن کی تلاوت");
    }

    #[test]
    fn prayer_reminders_cover_five_prayers() {
        let t = timings_on(wednesday(), 7, 1);
        let rs = prayer_reminders(&t, Language::En);
        assert_eq!(rs.len(), 5);
        assert_eq!(rs[0].title, "🕌 Fajr Prayer Time");
        assert_eq!(rs[0].time, t.fajr);
        assert_eq!(rs[4].body, "It's time for Isha prayer");

        let ur = prayer_reminders(&t, Language::Urdu);
        assert_eq!(ur[3].title, "🕌 مغرب کا وقت");
    }

    #[test]
    fn schedule_combines_sources() {
        let config = ReminderConfig::default();
        let t = timings_on(wednesday(), 7, 1);
        let custom = vec![reminder("Tahajjud", 3, 30)];

        let ScheduleMessage::ScheduleNotification { notifications } =
            build_schedule(&config, Some(&t), &custom).unwrap();
        assert_eq!(notifications.len(), 2 + 5 + 1);

        let ScheduleMessage::ScheduleNotification { notifications } =
            build_schedule(&config, None, &custom).unwrap();
        assert_eq!(notifications.len(), 3);
    }

    #[test]
    fn disabled_schedule_is_empty() {
        let config = ReminderConfig {
            enabled: false,
            ..ReminderConfig::default()
        };
        let t = timings_on(wednesday(), 7, 1);
        let msg = build_schedule(&config, Some(&t), &[]).unwrap();
        assert_eq!(msg, ScheduleMessage::ScheduleNotification { notifications: vec![] });
    }
}
