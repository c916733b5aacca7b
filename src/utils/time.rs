use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Parse an upstream clock string such as `"18:02"`, `"18:02 (PKT)"` or
/// `"18:02(+05:00)"` into a time of day.
pub fn sanitize_time(raw: &str) -> Result<NaiveTime> {
    let head = raw.split_whitespace().next().unwrap_or("");
    let head = head.split('(').next().unwrap_or("").trim();
    NaiveTime::parse_from_str(head, "%H:%M").map_err(|e| anyhow!("Bad time '{}': {}", raw, e))
}

pub fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Unknown timezone '{}': {}", name, e))
}

/// Resolve a wall-clock date and time in `tz` to an instant.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times
/// inside a spring-forward gap are moved forward by the gap.
pub fn local_instant(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(first, second) => first.min(second),
        LocalResult::None => {
            log::debug!("{} does not exist in {}; shifting past the gap", naive, tz);
            tz.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        }
    }
}

/// Time until the first instant after the next local midnight, padded by
/// `pad_secs` so a refresh lands on the new day.
pub fn until_next_midnight(now: &DateTime<Tz>, pad_secs: i64) -> Duration {
    let tomorrow = now.date_naive().succ_opt().unwrap_or(now.date_naive());
    let midnight = local_instant(&now.timezone(), tomorrow, NaiveTime::MIN);
    (midnight - *now) + Duration::seconds(pad_secs)
}

/// `HH:MM` serde adapter for clock times; deserialising accepts the same
/// suffixed forms as [`sanitize_time`].
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::sanitize_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_upstream_suffixes() {
        let expected = NaiveTime::from_hms_opt(18, 2, 0).unwrap();
        assert_eq!(sanitize_time("18:02").unwrap(), expected);
        assert_eq!(sanitize_time("18:02 (PKT)").unwrap(), expected);
        assert_eq!(sanitize_time("18:02(+05:00)").unwrap(), expected);
        assert_eq!(sanitize_time(" 18:02 ").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(sanitize_time("").is_err());
        assert!(sanitize_time("25:61").is_err());
        assert!(sanitize_time("sunset").is_err());
    }

    #[test]
    fn resolves_fixed_offset_zone() {
        let tz = parse_tz("Asia/Karachi").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        let dt = local_instant(&tz, date, NaiveTime::from_hms_opt(18, 5, 0).unwrap());
        assert_eq!(dt.to_rfc3339(), "2025-01-30T18:05:00+05:00");
    }

    #[test]
    fn skips_spring_forward_gap() {
        let tz = parse_tz("Europe/London").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        let dt = local_instant(&tz, date, NaiveTime::from_hms_opt(1, 30, 0).unwrap());
        assert_eq!(dt.to_rfc3339(), "2025-03-30T02:30:00+01:00");
    }

    #[test]
    fn midnight_refresh_is_padded() {
        let tz = parse_tz("Asia/Karachi").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        let now = local_instant(&tz, date, NaiveTime::from_hms_opt(23, 0, 0).unwrap());
        assert_eq!(until_next_midnight(&now, 5), Duration::seconds(3605));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert!(parse_tz("Mars/Olympus").is_err());
    }
}
