use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use std::io::Write;

use crate::models::{DailyTimings, Occasion, OccasionWindow};
use crate::occasion::calculator::{self, MIRAJ_MONTH, MIRAJ_NIGHT_DAY};
use crate::utils::format::format_time;

/// Ishraq is taken as 20 minutes after sunrise.
pub const ISHRAQ_AFTER_SUNRISE_MINS: i64 = 20;
/// Duha al-Kubra is taken as 45 minutes before Dhuhr.
pub const DUHA_BEFORE_DHUHR_MINS: i64 = 45;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarRow {
    pub date: String,
    pub hijri: String,
    pub fajr: String,
    pub sunrise: String,
    pub ishraq: String,
    pub duha_kubra: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

pub const HEADERS: [&str; 10] = [
    "Date",
    "Hijri",
    "Fajr",
    "Sunrise",
    "Ishraq",
    "Duha al Kubra",
    "Dhuhr",
    "Asr",
    "Maghrib",
    "Isha",
];

pub fn ishraq(sunrise: NaiveTime) -> NaiveTime {
    sunrise + Duration::minutes(ISHRAQ_AFTER_SUNRISE_MINS)
}

pub fn duha_kubra(dhuhr: NaiveTime) -> NaiveTime {
    dhuhr - Duration::minutes(DUHA_BEFORE_DHUHR_MINS)
}

impl From<&DailyTimings> for CalendarRow {
    fn from(t: &DailyTimings) -> Self {
        Self {
            date: t.date.format("%d-%m-%Y").to_string(),
            hijri: t.hijri.numeric(),
            fajr: format_time(t.fajr),
            sunrise: format_time(t.sunrise),
            ishraq: format_time(ishraq(t.sunrise)),
            duha_kubra: format_time(duha_kubra(t.dhuhr)),
            dhuhr: format_time(t.dhuhr),
            asr: format_time(t.asr),
            maghrib: format_time(t.maghrib),
            isha: format_time(t.isha),
        }
    }
}

impl CalendarRow {
    fn cells(&self) -> [&str; 10] {
        [
            self.date.as_str(),
            self.hijri.as_str(),
            self.fajr.as_str(),
            self.sunrise.as_str(),
            self.ishraq.as_str(),
            self.duha_kubra.as_str(),
            self.dhuhr.as_str(),
            self.asr.as_str(),
            self.maghrib.as_str(),
            self.isha.as_str(),
        ]
    }
}

pub fn rows(days: &[DailyTimings]) -> Vec<CalendarRow> {
    days.iter().map(CalendarRow::from).collect()
}

pub fn write_csv<W: Write>(rows: &[CalendarRow], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADERS).context("Writing CSV header")?;
    for row in rows {
        wtr.write_record(row.cells()).context("Writing CSV row")?;
    }
    wtr.flush()?;
    Ok(())
}

/// Fixed-width table, one line per day.
pub fn render_table(rows: &[CalendarRow]) -> Vec<String> {
    let widths: Vec<usize> = HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r.cells()[i].len())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: [&str; 10]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(HEADERS)];
    out.extend(rows.iter().map(|r| line(r.cells())));
    out
}

/// Occasion windows that open on one of `days`, in date order.
pub fn occasions_in(days: &[DailyTimings], tz: &Tz) -> Vec<OccasionWindow> {
    let mut windows = Vec::new();
    for t in days {
        if t.weekday == Weekday::Thu {
            windows.extend(calculator::window_for(Occasion::Jummah, t, tz));
        }
        if t.hijri.is(MIRAJ_MONTH, MIRAJ_NIGHT_DAY) {
            windows.extend(calculator::window_for(Occasion::ShabeMiraj, t, tz));
        }
    }
    windows
}

pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}
