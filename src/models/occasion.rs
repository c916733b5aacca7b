use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::PrayerName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occasion {
    /// Thursday Maghrib until Friday Maghrib.
    Jummah,
    /// Maghrib of 27 Rajab until Maghrib of 28 Rajab.
    ShabeMiraj,
}

impl Occasion {
    pub fn all() -> [Occasion; 2] {
        [Occasion::Jummah, Occasion::ShabeMiraj]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Occasion::Jummah => "Jummah Mubarak",
            Occasion::ShabeMiraj => "Shab-e-Miraj",
        }
    }

    pub fn urdu_name(&self) -> &'static str {
        match self {
            Occasion::Jummah => "جمعہ مبارک",
            Occasion::ShabeMiraj => "شبِ معراج",
        }
    }

    pub fn reminder(&self) -> &'static str {
        match self {
            Occasion::Jummah => "Recite Surah Al-Kahf and send Durood in abundance",
            Occasion::ShabeMiraj => "Night of the Prophet's Ascension: Quran, Durood, Nawafil",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    pub fn from_bool(show: bool) -> Self {
        if show {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    pub fn is_visible(&self) -> bool {
        *self == Visibility::Visible
    }
}

/// Half-open interval `[start, end)` during which an occasion banner shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccasionWindow {
    pub occasion: Occasion,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl OccasionWindow {
    pub fn contains(&self, now: &DateTime<Tz>) -> bool {
        *now >= self.start && *now < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPrayerCandidate {
    pub prayer: PrayerName,
    pub instant: DateTime<Tz>,
    pub time: NaiveTime,
    /// Set when every prayer today has passed and this is tomorrow's Fajr.
    pub tomorrow: bool,
}

impl NextPrayerCandidate {
    pub fn display_time(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// Whole seconds until the candidate, never negative.
    pub fn seconds_until(&self, now: &DateTime<Tz>) -> i64 {
        (self.instant - *now).num_seconds().max(0)
    }
}
