use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Jummah,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// The five obligatory prayers as they appear in a weekday schedule.
    pub fn obligatory() -> [PrayerName; 5] {
        [
            PrayerName::Fajr,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Jummah => "Jummah",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn urdu_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "فجر",
            PrayerName::Sunrise => "طلوع آفتاب",
            PrayerName::Dhuhr => "ظہر",
            PrayerName::Jummah => "جمعہ",
            PrayerName::Asr => "عصر",
            PrayerName::Maghrib => "مغرب",
            PrayerName::Isha => "عشاء",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HijriDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub month_en: String,
    #[serde(default)]
    pub month_ar: String,
}

impl HijriDate {
    pub fn is(&self, month: u32, day: u32) -> bool {
        self.month == month && self.day == day
    }

    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_en, self.year)
    }

    /// `dd-mm-yyyy`, the same shape the upstream provider uses.
    pub fn numeric(&self) -> String {
        format!("{:02}-{:02}-{}", self.day, self.month, self.year)
    }
}

/// One day's timings as delivered by a provider. Never mutated after
/// construction; a refresh produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTimings {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub hijri: HijriDate,
    pub fajr: NaiveTime,
    pub sunrise: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
}

impl DailyTimings {
    /// Clock time of a provider-supplied prayer. Jummah is not supplied
    /// upstream and yields `None`.
    pub fn time_of(&self, prayer: PrayerName) -> Option<NaiveTime> {
        match prayer {
            PrayerName::Fajr => Some(self.fajr),
            PrayerName::Sunrise => Some(self.sunrise),
            PrayerName::Dhuhr => Some(self.dhuhr),
            PrayerName::Jummah => None,
            PrayerName::Asr => Some(self.asr),
            PrayerName::Maghrib => Some(self.maghrib),
            PrayerName::Isha => Some(self.isha),
        }
    }

    pub fn schedule(&self) -> [(PrayerName, NaiveTime); 6] {
        [
            (PrayerName::Fajr, self.fajr),
            (PrayerName::Sunrise, self.sunrise),
            (PrayerName::Dhuhr, self.dhuhr),
            (PrayerName::Asr, self.asr),
            (PrayerName::Maghrib, self.maghrib),
            (PrayerName::Isha, self.isha),
        ]
    }

    pub fn is_friday(&self) -> bool {
        self.weekday == Weekday::Fri
    }

    pub fn is_thursday(&self) -> bool {
        self.weekday == Weekday::Thu
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    /// Timings used across the calculator tests: Fajr 05:10, Dhuhr 12:05,
    /// Asr 15:40, Maghrib 18:02, Isha 19:25.
    pub fn timings_on(date: NaiveDate, hijri_month: u32, hijri_day: u32) -> DailyTimings {
        use chrono::Datelike;
        DailyTimings {
            date,
            weekday: date.weekday(),
            hijri: HijriDate {
                day: hijri_day,
                month: hijri_month,
                year: 1447,
                month_en: "Rajab".to_string(),
                month_ar: "رَجَب".to_string(),
            },
            fajr: t("05:10"),
            sunrise: t("06:30"),
            dhuhr: t("12:05"),
            asr: t("15:40"),
            maghrib: t("18:02"),
            isha: t("19:25"),
        }
    }

    // 2025-01-01 was a Wednesday.
    pub fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    pub fn thursday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    pub fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
    }
}
