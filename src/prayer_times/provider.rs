use chrono::NaiveDate;
use thiserror::Error;

use crate::config::settings::{MasjidConfig, TimingsSource};
use crate::models::DailyTimings;
use crate::prayer_times::aladhan::AlAdhanProvider;
use crate::prayer_times::offline::OfflineProvider;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned code {code}: {message}")]
    Upstream { code: u16, message: String },
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("offline calculation failed: {0}")]
    Calculation(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

/// Source of daily timings. Implementations are moved onto the fetch
/// worker thread, hence `Send`.
pub trait TimingsProvider: Send {
    fn name(&self) -> &'static str;

    fn day(&self, date: NaiveDate) -> Result<DailyTimings, FetchError>;

    /// Every day of a Gregorian month, in order.
    fn month(&self, year: i32, month: u32) -> Result<Vec<DailyTimings>, FetchError>;
}

pub fn from_config(config: &MasjidConfig) -> anyhow::Result<Box<dyn TimingsProvider>> {
    Ok(match config.source {
        TimingsSource::Aladhan => Box::new(AlAdhanProvider::new(
            config.latitude,
            config.longitude,
            &config.calc_method,
            &config.madhab,
        )?
        .with_base_url(&config.api_url)),
        TimingsSource::Offline => Box::new(OfflineProvider::new(
            config.latitude,
            config.longitude,
            &config.calc_method,
            &config.madhab,
            config.tz()?,
            config.hijri_offset,
        )?),
    })
}
