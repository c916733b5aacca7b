use anyhow::{anyhow, Result};

/// Transliterated names of the 114 surahs, in mushaf order.
pub const SURAH_NAMES: [&str; 114] = [
    "Al-Fatihah", "Al-Baqarah", "Aal-i-Imran", "An-Nisa'", "Al-Ma'idah",
    "Al-An'am", "Al-A'raf", "Al-Anfal", "At-Tawbah", "Yunus",
    "Hud", "Yusuf", "Ar-Ra'd", "Ibrahim", "Al-Hijr",
    "An-Nahl", "Al-Isra'", "Al-Kahf", "Maryam", "Ta-Ha",
    "Al-Anbiya'", "Al-Hajj", "Al-Mu'minun", "An-Nur", "Al-Furqan",
    "Ash-Shu'ara'", "An-Naml", "Al-Qasas", "Al-Ankabut", "Ar-Rum",
    "Luqman", "As-Sajdah", "Al-Ahzab", "Saba'", "Fatir",
    "Ya-Sin", "As-Saffat", "Sad", "Az-Zumar", "Ghafir",
    "Fussilat", "Ash-Shura", "Az-Zukhruf", "Ad-Dukhan", "Al-Jathiyah",
    "Al-Ahqaf", "Muhammad", "Al-Fath", "Al-Hujurat", "Qaf",
    "Adh-Dhariyat", "At-Tur", "An-Najm", "Al-Qamar", "Ar-Rahman",
    "Al-Waqi'ah", "Al-Hadid", "Al-Mujadila", "Al-Hashr", "Al-Mumtahanah",
    "As-Saff", "Al-Jumu'ah", "Al-Munafiqun", "At-Taghabun", "At-Talaq",
    "At-Tahrim", "Al-Mulk", "Al-Qalam", "Al-Haqqah", "Al-Ma'arij",
    "Nuh", "Al-Jinn", "Al-Muzzammil", "Al-Muddaththir", "Al-Qiyamah",
    "Al-Insan", "Al-Mursalat", "An-Naba'", "An-Nazi'at", "Abasa",
    "At-Takwir", "Al-Infitar", "Al-Mutaffifin", "Al-Inshiqaq", "Al-Buruj",
    "At-Tariq", "Al-A'la", "Al-Ghashiyah", "Al-Fajr", "Al-Balad",
    "Ash-Shams", "Al-Layl", "Ad-Duha", "Ash-Sharh", "At-Tin",
    "Al-Alaq", "Al-Qadr", "Al-Bayyinah", "Az-Zalzalah", "Al-Adiyat",
    "Al-Qari'ah", "At-Takathur", "Al-Asr", "Al-Humazah", "Al-Fil",
    "Quraysh", "Al-Ma'un", "Al-Kawthar", "Al-Kafirun", "An-Nasr",
    "Al-Masad", "Al-Ikhlas", "Al-Falaq", "An-Nas",
];

pub fn name_of(number: u32) -> Option<&'static str> {
    let idx = usize::try_from(number).ok()?.checked_sub(1)?;
    SURAH_NAMES.get(idx).copied()
}

pub fn check_number(number: u32) -> Result<()> {
    if name_of(number).is_none() {
        return Err(anyhow!("Surah number {} is outside 1-{}", number, SURAH_NAMES.len()));
    }
    Ok(())
}

/// "N. Name" label used both for listing and for matching.
pub fn label(number: u32, name: &str) -> String {
    format!("{}. {}", number, name)
}

/// Surahs whose label contains `filter`, case-insensitively. An empty
/// filter lists all of them.
pub fn search(filter: &str) -> Vec<(u32, &'static str)> {
    let needle = filter.trim().to_lowercase();
    (1u32..)
        .zip(SURAH_NAMES.iter().copied())
        .filter(|(n, name)| needle.is_empty() || label(*n, name).to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_numbered_from_one() {
        assert_eq!(name_of(1), Some("Al-Fatihah"));
        assert_eq!(name_of(18), Some("Al-Kahf"));
        assert_eq!(name_of(114), Some("An-Nas"));
        assert_eq!(name_of(0), None);
        assert_eq!(name_of(115), None);
    }

    #[test]
    fn surah_numbers_outside_the_mushaf_are_rejected() {
        assert!(check_number(1).is_ok());
        assert!(check_number(114).is_ok());
        let err = check_number(0).unwrap_err().to_string();
        assert!(err.contains("outside 1-114"));
        assert!(check_number(115).is_err());
    }

    #[test]
    fn empty_filter_lists_everything() {
        assert_eq!(search("").len(), 114);
        assert_eq!(search("   ").len(), 114);
    }

    #[test]
    fn matches_name_case_insensitively() {
        let hits = search("kahf");
        assert_eq!(hits, vec![(18, "Al-Kahf")]);
    }

    #[test]
    fn matches_on_number_prefix() {
        let hits: Vec<u32> = search("36.").into_iter().map(|(n, _)| n).collect();
        assert_eq!(hits, vec![36]);
    }
}
