use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;

use crate::db::repository::{MetaRepo, TimingsRepo};
use crate::models::DailyTimings;
use crate::prayer_times::calendar::month_bounds;
use crate::prayer_times::provider::TimingsProvider;

/// `app_meta` key holding the RFC 3339 time of the last successful fetch.
pub const LAST_FETCH_KEY: &str = "last_fetch";

pub fn mark_fetched(conn: &Connection) -> Result<()> {
    MetaRepo::set(conn, LAST_FETCH_KEY, &chrono::Utc::now().to_rfc3339())
}

pub fn last_fetched(conn: &Connection) -> Result<Option<String>> {
    MetaRepo::get(conn, LAST_FETCH_KEY)
}

/// Timings together with the refresh error, if they came from the cache.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub stale: Option<String>,
}

/// Fetch one day from `provider`, caching it. When the provider fails the
/// cached copy for that date is returned instead, marked stale.
pub fn load_day(
    conn: &Connection,
    provider: &dyn TimingsProvider,
    date: NaiveDate,
) -> Result<Loaded<DailyTimings>> {
    match provider.day(date) {
        Ok(timings) => {
            TimingsRepo::store(conn, &timings, provider.name())?;
            mark_fetched(conn)?;
            Ok(Loaded {
                value: timings,
                stale: None,
            })
        }
        Err(e) => {
            warn!("{} fetch for {} failed: {}", provider.name(), date, e);
            match TimingsRepo::get(conn, date)? {
                Some(cached) => {
                    info!("Using cached timings for {}", date);
                    Ok(Loaded {
                        value: cached,
                        stale: Some(e.to_string()),
                    })
                }
                None => Err(anyhow!("No timings for {}: {}", date, e)),
            }
        }
    }
}

/// Every day of a Gregorian month, from the provider or, failing that, from
/// whatever the cache holds for that month.
pub fn load_month(
    conn: &mut Connection,
    provider: &dyn TimingsProvider,
    year: i32,
    month: u32,
) -> Result<Loaded<Vec<DailyTimings>>> {
    let (first, last) =
        month_bounds(year, month).ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
    match provider.month(year, month) {
        Ok(days) => {
            TimingsRepo::store_all(conn, &days, provider.name())?;
            mark_fetched(conn)?;
            Ok(Loaded {
                value: days,
                stale: None,
            })
        }
        Err(e) => {
            warn!("{} calendar {}-{} failed: {}", provider.name(), year, month, e);
            let cached = TimingsRepo::range(conn, first, last)?;
            if cached.is_empty() {
                return Err(anyhow!("No timings for {}-{:02}: {}", year, month, e));
            }
            Ok(Loaded {
                value: cached,
                stale: Some(e.to_string()),
            })
        }
    }
}
