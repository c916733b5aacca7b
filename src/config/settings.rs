use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::time::{parse_tz, sanitize_time};

fn default_name() -> String {
    "Mahmood Masjid".to_string()
}
fn default_latitude() -> f64 {
    32.5847
}
fn default_longitude() -> f64 {
    74.0758
}
fn default_calc_method() -> String {
    "Karachi".to_string()
}
fn default_madhab() -> String {
    "Hanafi".to_string()
}
fn default_timezone() -> String {
    "Asia/Karachi".to_string()
}
fn default_jummah_time() -> String {
    crate::occasion::calculator::default_jummah_time()
        .format("%H:%M")
        .to_string()
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_reevaluate_secs() -> u64 {
    60
}
fn default_quran_time() -> String {
    "07:00".to_string()
}
fn default_durood_time() -> String {
    "18:00".to_string()
}
fn default_edition() -> String {
    "quran-uthmani".to_string()
}
fn default_timings_api() -> String {
    crate::prayer_times::aladhan::DEFAULT_BASE_URL.to_string()
}
fn default_quran_api() -> String {
    crate::quran::client::DEFAULT_BASE_URL.to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingsSource {
    #[default]
    Aladhan,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Urdu,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasjidConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    /// IANA zone all instants are compared in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Fixed congregational time on Fridays, "HH:MM".
    #[serde(default = "default_jummah_time")]
    pub jummah_time: String,
    #[serde(default)]
    pub source: TimingsSource,
    /// Days to add/subtract from the tabular Hijri date (offline source only).
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
    /// Base URL of the AlAdhan-compatible timings API (or a mirror).
    #[serde(default = "default_timings_api")]
    pub api_url: String,
}

impl Default for MasjidConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            timezone: default_timezone(),
            jummah_time: default_jummah_time(),
            source: TimingsSource::default(),
            hijri_offset: default_hijri_offset(),
            api_url: default_timings_api(),
        }
    }
}

impl MasjidConfig {
    pub fn tz(&self) -> Result<Tz> {
        parse_tz(&self.timezone)
    }

    pub fn jummah(&self) -> Result<NaiveTime> {
        sanitize_time(&self.jummah_time).context("Parsing masjid.jummah_time")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Re-fetch every hour in addition to just after midnight.
    #[serde(default = "default_true")]
    pub hourly: bool,
    #[serde(default = "default_reevaluate_secs")]
    pub reevaluate_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            hourly: true,
            reevaluate_secs: default_reevaluate_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub prayer_times: bool,
    #[serde(default = "default_true")]
    pub quran_enabled: bool,
    #[serde(default = "default_quran_time")]
    pub quran_time: String,
    #[serde(default = "default_true")]
    pub durood_enabled: bool,
    #[serde(default = "default_durood_time")]
    pub durood_time: String,
    #[serde(default)]
    pub language: Language,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prayer_times: true,
            quran_enabled: true,
            quran_time: default_quran_time(),
            durood_enabled: true,
            durood_time: default_durood_time(),
            language: Language::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuranConfig {
    #[serde(default = "default_edition")]
    pub edition: String,
    #[serde(default = "default_quran_api")]
    pub api_url: String,
}

impl Default for QuranConfig {
    fn default() -> Self {
        Self {
            edition: default_edition(),
            api_url: default_quran_api(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub masjid: MasjidConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub quran: QuranConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "mihrab")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("mihrab.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Reject values that would only fail later inside the board.
    pub fn validate(&self) -> Result<()> {
        self.masjid.tz()?;
        self.masjid.jummah()?;
        crate::prayer_times::aladhan::method_id(&self.masjid.calc_method)?;
        crate::prayer_times::aladhan::school_id(&self.masjid.madhab)?;
        sanitize_time(&self.reminders.quran_time).context("Parsing reminders.quran_time")?;
        sanitize_time(&self.reminders.durood_time).context("Parsing reminders.durood_time")?;
        if self.refresh.reevaluate_secs == 0 {
            return Err(anyhow!("refresh.reevaluate_secs must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.masjid.timezone, "Asia/Karachi");
        assert_eq!(config.masjid.source, TimingsSource::Aladhan);
        assert_eq!(config.refresh.reevaluate_secs, 60);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[masjid]\nname = \"Jamia\"\njummah_time = \"13:30\"\nsource = \"offline\"\n",
        )
        .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.masjid.name, "Jamia");
        assert_eq!(config.masjid.source, TimingsSource::Offline);
        assert_eq!(
            config.masjid.jummah().unwrap(),
            NaiveTime::from_hms_opt(13, 30, 0).unwrap()
        );
        assert_eq!(config.masjid.madhab, "Hanafi");
        assert!(config.reminders.enabled);
    }

    #[test]
    fn api_urls_default_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[quran]\napi_url = \"http://mirror.local/v1\"\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.masjid.api_url, "https://api.aladhan.com/v1");
        assert_eq!(config.quran.api_url, "http://mirror.local/v1");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.reminders.language = Language::Urdu;
        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.reminders.language, Language::Urdu);
    }

    #[test]
    fn invalid_timezone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[masjid]\ntimezone = \"Nowhere/Town\"\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
