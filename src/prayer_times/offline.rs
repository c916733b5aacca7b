use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use salah::prelude::*;

use crate::models::DailyTimings;
use crate::prayer_times::provider::{FetchError, TimingsProvider};
use crate::utils::hijri::to_hijri;

/// Computes timings locally with the `salah` crate. Used when the board
/// runs without network access.
pub struct OfflineProvider {
    pub lat: f64,
    pub lng: f64,
    pub method_str: String,
    pub madhab_str: String,
    pub tz: Tz,
    pub hijri_offset: i32,
}

impl OfflineProvider {
    pub fn new(
        lat: f64,
        lng: f64,
        method: &str,
        madhab: &str,
        tz: Tz,
        hijri_offset: i32,
    ) -> Result<Self> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            lat,
            lng,
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            tz,
            hijri_offset,
        })
    }

    fn compute(&self, date: NaiveDate) -> Result<DailyTimings> {
        let coords = Coordinates::new(self.lat, self.lng);
        let method = parse_method(&self.method_str)?;
        let madhab = parse_madhab(&self.madhab_str)?;
        let params = Configuration::with(method, madhab);

        let times = PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| anyhow!("Prayer calculation failed: {}", e))?;

        // Whole minutes, matching what the online provider reports.
        let to_local = |utc: chrono::DateTime<chrono::Utc>| -> NaiveTime {
            let t = utc.with_timezone(&self.tz).time();
            NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
        };

        Ok(DailyTimings {
            date,
            weekday: date.weekday(),
            hijri: to_hijri(date, self.hijri_offset)?,
            fajr: to_local(times.time(Prayer::Fajr)),
            sunrise: to_local(times.time(Prayer::Sunrise)),
            dhuhr: to_local(times.time(Prayer::Dhuhr)),
            asr: to_local(times.time(Prayer::Asr)),
            maghrib: to_local(times.time(Prayer::Maghrib)),
            isha: to_local(times.time(Prayer::Isha)),
        })
    }
}

impl TimingsProvider for OfflineProvider {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn day(&self, date: NaiveDate) -> Result<DailyTimings, FetchError> {
        self.compute(date)
            .map_err(|e| FetchError::Calculation(e.to_string()))
    }

    fn month(&self, year: i32, month: u32) -> Result<Vec<DailyTimings>, FetchError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| FetchError::Calculation(format!("invalid month {}-{}", year, month)))?;
        let mut days = Vec::with_capacity(31);
        let mut date = first;
        while date.month() == month {
            days.push(self.day(date)?);
            date += Duration::days(1);
        }
        Ok(days)
    }
}

fn parse_method(s: &str) -> Result<Method> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        _ => Err(anyhow!("Unknown calculation method: '{}'", s)),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gujrat() -> OfflineProvider {
        OfflineProvider::new(
            32.5847,
            74.0758,
            "Karachi",
            "Hanafi",
            chrono_tz::Asia::Karachi,
            0,
        )
        .unwrap()
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(OfflineProvider::new(0.0, 0.0, "Moon", "Hanafi", chrono_tz::UTC, 0).is_err());
        assert!(OfflineProvider::new(0.0, 0.0, "Karachi", "Maliki", chrono_tz::UTC, 0).is_err());
    }

    #[test]
    fn day_is_ordered() {
        let t = gujrat().day(NaiveDate::from_ymd_opt(2025, 1, 30).unwrap()).unwrap();
        assert!(t.fajr < t.sunrise);
        assert!(t.sunrise < t.dhuhr);
        assert!(t.dhuhr < t.asr);
        assert!(t.asr < t.maghrib);
        assert!(t.maghrib < t.isha);
        assert_eq!(t.maghrib.second(), 0);
        assert_eq!(t.weekday, chrono::Weekday::Thu);
    }

    #[test]
    fn month_covers_every_day() {
        let days = gujrat().month(2024, 2).unwrap();
        assert_eq!(days.len(), 29);
        assert_eq!(days[28].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
