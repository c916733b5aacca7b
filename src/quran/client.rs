use anyhow::{anyhow, Result};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::Surah;
use crate::prayer_times::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.alquran.cloud/v1";

#[derive(Debug, Deserialize)]
struct Envelope {
    code: u16,
    status: String,
    data: serde_json::Value,
}

/// Fetches surah text from the Al-Quran Cloud API.
pub struct QuranClient {
    client: Client,
    base_url: String,
    edition: String,
}

impl QuranClient {
    pub fn new(edition: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow!("Building HTTP client: {}", e))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            edition: edition.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn surah_url(&self, number: u32) -> String {
        format!("{}/surah/{}/{}", self.base_url, number, self.edition)
    }

    /// Callers validate `number` with [`super::check_number`] first.
    pub fn surah(&self, number: u32) -> Result<Surah, FetchError> {
        let url = self.surah_url(number);
        debug!("GET {}", url);
        let body = self.client.get(&url).send()?.text()?;
        parse_surah(&body)
    }
}

/// Decode a `/surah/{n}/{edition}` response; any status but "OK" is an error.
pub fn parse_surah(body: &str) -> Result<Surah, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.status != "OK" {
        let message = match envelope.data {
            serde_json::Value::String(s) => s,
            _ => envelope.status,
        };
        return Err(FetchError::Upstream {
            code: envelope.code,
            message,
        });
    }
    Ok(serde_json::from_value(envelope.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IKHLAS: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "number": 112,
            "name": "سُورَةُ الإِخۡلَاصِ",
            "englishName": "Al-Ikhlaas",
            "englishNameTranslation": "Sincerity",
            "numberOfAyahs": 4,
            "revelationType": "Meccan",
            "ayahs": [
                {"number": 6222, "text": "قُلۡ هُوَ ٱللَّهُ أَحَدٌ", "numberInSurah": 1, "juz": 30},
                {"number": 6223, "text": "ٱللَّهُ ٱلصَّمَدُ", "numberInSurah": 2, "juz": 30},
                {"number": 6224, "text": "لَمۡ يَلِدۡ وَلَمۡ يُولَدۡ", "numberInSurah": 3, "juz": 30},
                {"number": 6225, "text": "وَلَمۡ يَكُن لَّهُۥ كُفُوًا أَحَدُۢ", "numberInSurah": 4, "juz": 30}
            ]
        }
    }"#;

    #[test]
    fn parses_surah() {
        let s = parse_surah(IKHLAS).unwrap();
        assert_eq!(s.number, 112);
        assert_eq!(s.english_name, "Al-Ikhlaas");
        assert_eq!(s.number_of_ayahs, 4);
        assert_eq!(s.ayahs.len(), 4);
        assert_eq!(s.ayahs[3].number_in_surah, 4);
    }

    #[test]
    fn non_ok_status_is_upstream_error() {
        let body = r#"{"code": 404, "status": "NOT FOUND", "data": "Not found."}"#;
        assert!(matches!(
            parse_surah(body),
            Err(FetchError::Upstream { code: 404, .. })
        ));
    }

    #[test]
    fn builds_url() {
        let client = QuranClient::new("quran-uthmani").unwrap();
        assert_eq!(
            client.surah_url(1),
            "https://api.alquran.cloud/v1/surah/1/quran-uthmani"
        );
        let mirrored = client.with_base_url("http://mirror.local/v1/");
        assert_eq!(mirrored.surah_url(36), "http://mirror.local/v1/surah/36/quran-uthmani");
    }
}
