use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::models::{DailyTimings, HijriDate};
use crate::prayer_times::provider::{FetchError, TimingsProvider};
use crate::utils::hijri::month_names;
use crate::utils::time::sanitize_time;

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com/v1";

#[derive(Debug, Deserialize)]
struct Envelope {
    code: u16,
    #[serde(default)]
    status: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DayPayload {
    timings: HashMap<String, String>,
    date: DatePayload,
}

#[derive(Debug, Deserialize)]
struct DatePayload {
    gregorian: GregorianPayload,
    hijri: HijriPayload,
}

#[derive(Debug, Deserialize)]
struct GregorianPayload {
    date: String,
    weekday: Named,
}

#[derive(Debug, Deserialize)]
struct HijriPayload {
    date: String,
    month: MonthPayload,
}

#[derive(Debug, Deserialize)]
struct Named {
    en: String,
}

#[derive(Debug, Deserialize)]
struct MonthPayload {
    number: u32,
    #[serde(default)]
    en: String,
    #[serde(default)]
    ar: String,
}

/// Client for the AlAdhan timings API.
pub struct AlAdhanProvider {
    client: Client,
    base_url: String,
    lat: f64,
    lng: f64,
    method: u8,
    school: u8,
}

impl AlAdhanProvider {
    pub fn new(lat: f64, lng: f64, method: &str, madhab: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow!("Building HTTP client: {}", e))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            lat,
            lng,
            method: method_id(method)?,
            school: school_id(madhab)?,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn day_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/timings/{}?latitude={}&longitude={}&method={}&school={}",
            self.base_url,
            date.format("%d-%m-%Y"),
            self.lat,
            self.lng,
            self.method,
            self.school
        )
    }

    fn month_url(&self, year: i32, month: u32) -> String {
        format!(
            "{}/calendar?latitude={}&longitude={}&method={}&school={}&month={}&year={}",
            self.base_url, self.lat, self.lng, self.method, self.school, month, year
        )
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        Ok(self.client.get(url).send()?.text()?)
    }
}

impl TimingsProvider for AlAdhanProvider {
    fn name(&self) -> &'static str {
        "aladhan"
    }

    fn day(&self, date: NaiveDate) -> Result<DailyTimings, FetchError> {
        parse_day(&self.get(&self.day_url(date))?)
    }

    fn month(&self, year: i32, month: u32) -> Result<Vec<DailyTimings>, FetchError> {
        parse_month(&self.get(&self.month_url(year, month))?)
    }
}

/// Strip the `{code, status, data}` envelope; any code but 200 is an error.
fn unwrap_envelope(body: &str) -> Result<serde_json::Value, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.code != 200 {
        let message = match envelope.data {
            serde_json::Value::String(s) => s,
            _ => envelope.status,
        };
        return Err(FetchError::Upstream {
            code: envelope.code,
            message,
        });
    }
    Ok(envelope.data)
}

pub fn parse_day(body: &str) -> Result<DailyTimings, FetchError> {
    to_daily(serde_json::from_value(unwrap_envelope(body)?)?)
}

pub fn parse_month(body: &str) -> Result<Vec<DailyTimings>, FetchError> {
    let days: Vec<DayPayload> = serde_json::from_value(unwrap_envelope(body)?)?;
    days.into_iter().map(to_daily).collect()
}

fn to_daily(payload: DayPayload) -> Result<DailyTimings, FetchError> {
    let date = NaiveDate::parse_from_str(&payload.date.gregorian.date, "%d-%m-%Y").map_err(|e| {
        FetchError::Malformed(format!("gregorian date '{}': {}", payload.date.gregorian.date, e))
    })?;

    let weekday = match payload.date.gregorian.weekday.en.parse::<Weekday>() {
        Ok(w) => w,
        Err(_) => {
            warn!(
                "Unrecognised weekday '{}', using the calendar's",
                payload.date.gregorian.weekday.en
            );
            date.weekday()
        }
    };

    let time = |name: &str| {
        let raw = payload
            .timings
            .get(name)
            .ok_or_else(|| FetchError::Malformed(format!("missing timing '{}'", name)))?;
        sanitize_time(raw).map_err(|e| FetchError::Malformed(e.to_string()))
    };

    Ok(DailyTimings {
        date,
        weekday,
        hijri: to_hijri(&payload.date.hijri)?,
        fajr: time("Fajr")?,
        sunrise: time("Sunrise")?,
        dhuhr: time("Dhuhr")?,
        asr: time("Asr")?,
        maghrib: time("Maghrib")?,
        isha: time("Isha")?,
    })
}

fn to_hijri(payload: &HijriPayload) -> Result<HijriDate, FetchError> {
    let malformed = || FetchError::Malformed(format!("hijri date '{}'", payload.date));
    let mut parts = payload.date.split('-').map(|p| p.trim().parse::<i64>());
    let (Some(Ok(day)), Some(Ok(month)), Some(Ok(year))) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    if month != payload.month.number as i64 || !(1..=30).contains(&day) {
        return Err(malformed());
    }

    let (fallback_en, fallback_ar) = month_names(payload.month.number);
    let pick = |given: &str, fallback: &str| {
        if given.is_empty() {
            fallback.to_string()
        } else {
            given.to_string()
        }
    };
    Ok(HijriDate {
        day: day as u32,
        month: payload.month.number,
        year: year as i32,
        month_en: pick(&payload.month.en, fallback_en),
        month_ar: pick(&payload.month.ar, fallback_ar),
    })
}

/// AlAdhan numeric calculation method for a method name.
pub fn method_id(s: &str) -> Result<u8> {
    match s {
        "Karachi" => Ok(1),
        "NorthAmerica" => Ok(2),
        "MuslimWorldLeague" => Ok(3),
        "UmmAlQura" => Ok(4),
        "Egyptian" => Ok(5),
        "Tehran" => Ok(7),
        "Kuwait" => Ok(9),
        "Qatar" => Ok(10),
        "Singapore" => Ok(11),
        "Turkey" => Ok(13),
        "MoonsightingCommittee" => Ok(15),
        "Dubai" => Ok(16),
        _ => Err(anyhow!("Unknown calculation method: '{}'", s)),
    }
}

/// AlAdhan `school` parameter: 0 = Shafi (standard Asr), 1 = Hanafi.
pub fn school_id(s: &str) -> Result<u8> {
    match s {
        "Hanafi" => Ok(1),
        "Shafi" | "Shafi'i" => Ok(0),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}

pub const CALC_METHODS: &[&str] = &[
    "Karachi",
    "NorthAmerica",
    "MuslimWorldLeague",
    "UmmAlQura",
    "Egyptian",
    "Tehran",
    "Kuwait",
    "Qatar",
    "Singapore",
    "Turkey",
    "MoonsightingCommittee",
    "Dubai",
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const DAY: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:10", "Sunrise": "06:30", "Dhuhr": "12:05",
                "Asr": "15:40", "Sunset": "18:00", "Maghrib": "18:02 (PKT)",
                "Isha": "19:25", "Imsak": "05:00", "Midnight": "00:05"
            },
            "date": {
                "readable": "30 Jan 2025",
                "gregorian": {
                    "date": "30-01-2025",
                    "weekday": {"en": "Thursday"}
                },
                "hijri": {
                    "date": "27-07-1446",
                    "day": "27",
                    "month": {"number": 7, "en": "Rajab", "ar": "رَجَب"},
                    "year": "1446"
                }
            }
        }
    }"#;

    #[test]
    fn parses_day_payload() {
        let t = parse_day(DAY).unwrap();
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2025, 1, 30).unwrap());
        assert_eq!(t.weekday, Weekday::Thu);
        assert_eq!(t.maghrib, NaiveTime::from_hms_opt(18, 2, 0).unwrap());
        assert_eq!(t.hijri.day, 27);
        assert_eq!(t.hijri.month, 7);
        assert_eq!(t.hijri.year, 1446);
        assert_eq!(t.hijri.month_en, "Rajab");
    }

    #[test]
    fn non_200_code_is_upstream_error() {
        let body = r#"{"code": 400, "status": "BAD_REQUEST", "data": "Please specify a valid latitude."}"#;
        match parse_day(body) {
            Err(FetchError::Upstream { code, message }) => {
                assert_eq!(code, 400);
                assert!(message.contains("latitude"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_timing_is_malformed() {
        let body = DAY.replace("\"Isha\": \"19:25\",", "");
        assert!(matches!(parse_day(&body), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(parse_day("<html>"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn parses_month_payload() {
        let day: serde_json::Value = serde_json::from_str(DAY).unwrap();
        let body = serde_json::json!({
            "code": 200,
            "status": "OK",
            "data": [day["data"].clone(), day["data"].clone()]
        })
        .to_string();
        assert_eq!(parse_month(&body).unwrap().len(), 2);
    }

    #[test]
    fn builds_urls() {
        let p = AlAdhanProvider::new(32.5847, 74.0758, "Karachi", "Hanafi")
            .unwrap()
            .with_base_url("http://localhost:9/v1/");
        let url = p.day_url(NaiveDate::from_ymd_opt(2025, 1, 30).unwrap());
        assert_eq!(
            url,
            "http://localhost:9/v1/timings/30-01-2025?latitude=32.5847&longitude=74.0758&method=1&school=1"
        );
        assert!(p.month_url(2025, 2).ends_with("&month=2&year=2025"));
    }

    #[test]
    fn every_listed_method_maps() {
        for m in CALC_METHODS {
            assert!(method_id(m).is_ok(), "{}", m);
        }
        assert!(method_id("Other").is_err());
        assert_eq!(school_id("Shafi").unwrap(), 0);
    }
}
