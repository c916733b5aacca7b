pub mod occasion;
pub mod reminder;
pub mod surah;
pub mod timings;

pub use occasion::{NextPrayerCandidate, Occasion, OccasionWindow, Visibility};
pub use reminder::{Reminder, ScheduleMessage};
pub use surah::Surah;
pub use timings::{DailyTimings, HijriDate, PrayerName};
