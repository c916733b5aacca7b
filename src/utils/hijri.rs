use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate as Tabular;

use crate::models::HijriDate;

/// Islamic month names (index 0 = Muharram = month 1), English then Arabic
const HIJRI_MONTH_NAMES: &[(&str, &str)] = &[
    ("Muharram", "مُحَرَّم"),
    ("Safar", "صَفَر"),
    ("Rabi' al-Awwal", "رَبيع الأوّل"),
    ("Rabi' al-Thani", "رَبيع الثاني"),
    ("Jumada al-Awwal", "جُمادى الأولى"),
    ("Jumada al-Thani", "جُمادى الآخرة"),
    ("Rajab", "رَجَب"),
    ("Sha'ban", "شَعْبان"),
    ("Ramadan", "رَمَضان"),
    ("Shawwal", "شَوّال"),
    ("Dhu al-Qi'dah", "ذوالقعدة"),
    ("Dhu al-Hijjah", "ذوالحجة"),
];

pub fn month_names(month: u32) -> (&'static str, &'static str) {
    match month {
        1..=12 => HIJRI_MONTH_NAMES[month as usize - 1],
        _ => ("Unknown", ""),
    }
}

/// Tabular Hijri date for a Gregorian day.
///
/// `offset_days` shifts the Gregorian input to follow local moon sighting
/// (e.g. -1 where the month starts a day after Saudi Arabia). Only the
/// offline provider uses this; online timings carry the provider's date.
pub fn to_hijri(date: NaiveDate, offset_days: i32) -> Result<HijriDate> {
    let adjusted = date + Duration::days(offset_days as i64);
    let hd = Tabular::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    let month = hd.month() as u32;
    let (month_en, month_ar) = month_names(month);
    Ok(HijriDate {
        day: hd.day() as u32,
        month,
        year: hd.year() as i32,
        month_en: month_en.to_string(),
        month_ar: month_ar.to_string(),
    })
}
