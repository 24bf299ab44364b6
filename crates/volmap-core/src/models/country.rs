use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use super::null_as_default;
use super::volunteer::Volunteer;

/// Per-country counters. All values default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Stats {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub active: u32,
    #[serde(default)]
    pub translators: u32,
    #[serde(default)]
    pub reviewers: u32,
    #[serde(default)]
    pub coordinators: u32,
    #[serde(default)]
    pub languages: u32,
}

/// A normalized per-country dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CountryRecord {
    #[serde(rename = "countryCode", alias = "code")]
    pub country_code: String,
    #[serde(rename = "countryName", alias = "country")]
    pub country_name: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub volunteers: Vec<Volunteer>,
}

impl CountryRecord {
    pub fn is_empty(&self) -> bool {
        self.volunteers.is_empty() && self.stats.total == 0
    }
}

/// Counters as they appear in a data file, where any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStats {
    pub total: Option<u32>,
    pub active: Option<u32>,
    pub translators: Option<u32>,
    pub reviewers: Option<u32>,
    pub coordinators: Option<u32>,
    pub languages: Option<u32>,
}

/// A country record as fetched, before normalization.
///
/// Files written by the map front end use `code`/`country` instead of
/// `countryCode`/`countryName`; both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCountryRecord {
    #[serde(rename = "countryCode", alias = "code", default)]
    pub country_code: Option<String>,
    #[serde(rename = "countryName", alias = "country", default)]
    pub country_name: Option<String>,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub stats: Option<RawStats>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volunteers: Vec<Volunteer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_accepts_legacy_keys() {
        let json = r#"{
            "country": "中国",
            "code": "CN",
            "lastUpdated": "2024-01-15",
            "stats": {"total": 2, "active": 1},
            "volunteers": []
        }"#;
        let raw: RawCountryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.country_code.as_deref(), Some("CN"));
        assert_eq!(raw.country_name.as_deref(), Some("中国"));
        let stats = raw.stats.unwrap();
        assert_eq!(stats.total, Some(2));
        assert_eq!(stats.reviewers, None);
    }

    #[test]
    fn test_raw_record_tolerates_missing_everything() {
        let raw: RawCountryRecord = serde_json::from_str("{}").unwrap();
        assert!(raw.stats.is_none());
        assert!(raw.volunteers.is_empty());

        let raw: RawCountryRecord = serde_json::from_str(r#"{"volunteers": null}"#).unwrap();
        assert!(raw.volunteers.is_empty());
    }

    #[test]
    fn test_record_writes_canonical_keys() {
        let record = CountryRecord {
            country_code: "FR".to_string(),
            country_name: "France".to_string(),
            last_updated: "2024-05-01".to_string(),
            stats: Stats::default(),
            volunteers: Vec::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["countryCode"], "FR");
        assert_eq!(json["countryName"], "France");
        assert_eq!(json["stats"]["languages"], 0);
        assert!(record.is_empty());
    }
}
