//! Country data store.
//!
//! Loads per-country records from a `CountrySource` and completes them:
//! missing counters are filled in, the language count is derived from the
//! volunteer list, and any failure degrades to an empty template. `load`
//! never returns an error.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

pub use crate::countries::is_valid_code;

use crate::countries::{self, Locale};
use crate::models::{CountryRecord, RawCountryRecord, Stats, Volunteer, VolunteerDraft};
use crate::source::{CountrySource, SourceError};

/// Why a load fell back to the empty template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// Blank, placeholder, or otherwise not an ISO-2 code
    InvalidCode,
    /// No record exists yet
    NotFound,
    /// Transport or parse failure, with the reason for display
    Failed(String),
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::InvalidCode => write!(f, "invalid country code"),
            LoadFailure::NotFound => write!(f, "no data yet"),
            LoadFailure::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// A loaded record plus the reason it is a template, if it is one
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub record: CountryRecord,
    pub failure: Option<LoadFailure>,
}

impl Loaded {
    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

/// Trim and upper-case a country code for use as a key
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Number of distinct language tags after trimming. "EN" and "en" are the
/// same language.
pub fn count_languages(volunteers: &[Volunteer]) -> u32 {
    volunteers
        .iter()
        .flat_map(Volunteer::trimmed_languages)
        .map(str::to_uppercase)
        .collect::<HashSet<_>>()
        .len() as u32
}

/// Record with zeroed stats and no volunteers
pub fn empty_template(code: &str, locale: Locale, today: NaiveDate) -> CountryRecord {
    CountryRecord {
        country_code: code.to_string(),
        country_name: countries::country_name(code, locale),
        last_updated: date_string(today),
        stats: Stats::default(),
        volunteers: Vec::new(),
    }
}

/// Complete a fetched record.
///
/// - no `stats` at all: `total` and `active` come from the volunteer count
/// - `total` missing: the volunteer count
/// - `active` missing: `total`
/// - other counters missing: 0
/// - `languages` missing or 0: distinct trimmed tags across all volunteers,
///   compared case-insensitively
pub fn normalize(raw: RawCountryRecord, code: &str, locale: Locale, today: NaiveDate) -> CountryRecord {
    let volunteer_count = raw.volunteers.len() as u32;
    let raw_stats = raw.stats.unwrap_or_default();

    let total = raw_stats.total.unwrap_or(volunteer_count);
    let languages = match raw_stats.languages {
        Some(n) if n > 0 => n,
        _ => count_languages(&raw.volunteers),
    };
    let stats = Stats {
        total,
        active: raw_stats.active.unwrap_or(total),
        translators: raw_stats.translators.unwrap_or(0),
        reviewers: raw_stats.reviewers.unwrap_or(0),
        coordinators: raw_stats.coordinators.unwrap_or(0),
        languages,
    };

    let country_name = raw
        .country_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| countries::country_name(code, locale));

    CountryRecord {
        country_code: code.to_string(),
        country_name,
        last_updated: raw
            .last_updated
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| date_string(today)),
        stats,
        volunteers: raw.volunteers,
    }
}

/// Append a volunteer built from `draft` to `record`.
///
/// The id is `{code}{n:03}` where `n` is the current volunteer count plus
/// one. `total` and `active` are both incremented, saturating at `u32::MAX`.
/// Two concurrent appends
/// to copies of the same record produce the same id.
pub fn append_volunteer(record: &mut CountryRecord, draft: VolunteerDraft, today: NaiveDate) -> Volunteer {
    let id = format!("{}{:03}", record.country_code, record.volunteers.len() + 1);
    let volunteer = draft.into_volunteer(id, today);

    record.volunteers.push(volunteer.clone());
    record.stats.total = record.stats.total.saturating_add(1);
    record.stats.active = record.stats.active.saturating_add(1);
    record.last_updated = date_string(today);

    volunteer
}

/// Loads and normalizes country records from one source
#[derive(Clone)]
pub struct CountryStore {
    source: Arc<dyn CountrySource>,
    locale: Locale,
}

impl CountryStore {
    pub fn new(source: Arc<dyn CountrySource>) -> Self {
        Self {
            source,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn source(&self) -> &dyn CountrySource {
        self.source.as_ref()
    }

    /// Load a country. Never fails; see `load_detailed` for the failure reason.
    pub async fn load(&self, code: &str) -> CountryRecord {
        self.load_detailed(code).await.record
    }

    pub async fn load_detailed(&self, code: &str) -> Loaded {
        let code = normalize_code(code);
        if !is_valid_code(&code) {
            warn!(code = %code, "Invalid country code");
            return self.fallback(&code, LoadFailure::InvalidCode);
        }

        match self.source.fetch(&code).await {
            Ok(raw) => {
                let record = normalize(raw, &code, self.locale, today());
                debug!(
                    country = %code,
                    volunteers = record.volunteers.len(),
                    total = record.stats.total,
                    "Loaded country data"
                );
                Loaded { record, failure: None }
            }
            Err(SourceError::NotFound(what)) => {
                debug!(country = %code, missing = %what, "No country data yet");
                self.fallback(&code, LoadFailure::NotFound)
            }
            Err(e) => {
                warn!(country = %code, source = %self.source.describe(), error = %e, "Failed to load country data");
                self.fallback(&code, LoadFailure::Failed(e.to_string()))
            }
        }
    }

    fn fallback(&self, code: &str, failure: LoadFailure) -> Loaded {
        Loaded {
            record: self.empty_template(code),
            failure: Some(failure),
        }
    }

    pub fn empty_template(&self, code: &str) -> CountryRecord {
        empty_template(code, self.locale, today())
    }

    /// Load a country and append a volunteer to the in-memory record.
    /// Nothing is persisted; call `save` for that.
    pub async fn add_volunteer(&self, code: &str, draft: VolunteerDraft) -> (CountryRecord, Volunteer) {
        let mut record = self.load(code).await;
        let volunteer = append_volunteer(&mut record, draft, today());
        info!(country = %record.country_code, id = %volunteer.id, "Added volunteer");
        (record, volunteer)
    }

    /// Write a record back through the source, if it accepts writes
    pub async fn save(&self, record: &CountryRecord) -> Result<(), SourceError> {
        self.source.store(record).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{RawStats, Role, Status};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts fetches
    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub records: HashMap<String, RawCountryRecord>,
        pub broken: Vec<String>,
        pub fetches: AtomicUsize,
    }

    impl MemorySource {
        pub fn with(mut self, code: &str, raw: RawCountryRecord) -> Self {
            self.records.insert(code.to_string(), raw);
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CountrySource for MemorySource {
        async fn fetch(&self, code: &str) -> Result<RawCountryRecord, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.broken.iter().any(|c| c == code) {
                return Err(SourceError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset",
                )));
            }
            self.records
                .get(code)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(code.to_string()))
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    pub(crate) fn volunteer(id: &str, languages: &[&str]) -> Volunteer {
        Volunteer {
            id: id.to_string(),
            name: format!("Volunteer {}", id),
            role: Role::Translator,
            languages: languages.iter().map(|l| l.to_string()).collect(),
            location: String::new(),
            joined_date: "2024-01-01".to_string(),
            status: Status::Active,
            completed_tasks: 0,
        }
    }

    pub(crate) fn raw_with_total(total: u32) -> RawCountryRecord {
        RawCountryRecord {
            stats: Some(RawStats {
                total: Some(total),
                ..RawStats::default()
            }),
            ..RawCountryRecord::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_normalize_without_stats_uses_volunteer_count() {
        let raw = RawCountryRecord {
            volunteers: vec![volunteer("CN001", &["ZH"]), volunteer("CN002", &["EN"]), volunteer("CN003", &[])],
            ..RawCountryRecord::default()
        };
        let record = normalize(raw, "CN", Locale::En, date());
        assert_eq!(record.stats.total, 3);
        assert_eq!(record.stats.total as usize, record.volunteers.len());
        assert_eq!(record.stats.active, 3);
        assert_eq!(record.stats.reviewers, 0);
        assert_eq!(record.stats.languages, 2);
        assert_eq!(record.country_name, "China");
        assert_eq!(record.last_updated, "2024-06-01");
    }

    #[test]
    fn test_language_count_trims_and_ignores_case() {
        let volunteers = vec![volunteer("A", &["EN", " en "]), volunteer("B", &["FR"])];
        assert_eq!(count_languages(&volunteers), 2);

        let volunteers = vec![volunteer("A", &["EN", " en ", "FR"])];
        assert_eq!(count_languages(&volunteers), 2);

        let volunteers = vec![volunteer("A", &["EN", " EN "]), volunteer("B", &["FR", "  "])];
        assert_eq!(count_languages(&volunteers), 2);
    }

    #[test]
    fn test_supplied_language_count_is_trusted() {
        let raw = RawCountryRecord {
            stats: Some(RawStats {
                languages: Some(7),
                ..RawStats::default()
            }),
            volunteers: vec![volunteer("US001", &["EN"])],
            ..RawCountryRecord::default()
        };
        assert_eq!(normalize(raw, "US", Locale::En, date()).stats.languages, 7);

        let raw = RawCountryRecord {
            stats: Some(RawStats {
                languages: Some(0),
                ..RawStats::default()
            }),
            volunteers: vec![volunteer("US001", &["EN", "ES"])],
            ..RawCountryRecord::default()
        };
        assert_eq!(normalize(raw, "US", Locale::En, date()).stats.languages, 2);
    }

    #[test]
    fn test_active_defaults_to_total() {
        let record = normalize(raw_with_total(5), "JP", Locale::En, date());
        assert_eq!(record.stats.total, 5);
        assert_eq!(record.stats.active, 5);
        assert_eq!(record.stats.translators, 0);
    }

    #[test]
    fn test_record_name_wins_over_table() {
        let raw = RawCountryRecord {
            country_name: Some("中华人民共和国".to_string()),
            last_updated: Some("2023-12-31".to_string()),
            ..RawCountryRecord::default()
        };
        let record = normalize(raw, "CN", Locale::En, date());
        assert_eq!(record.country_name, "中华人民共和国");
        assert_eq!(record.last_updated, "2023-12-31");
    }

    #[test]
    fn test_append_volunteer_assigns_next_id() {
        let raw = RawCountryRecord {
            volunteers: vec![volunteer("CN001", &[]), volunteer("CN002", &[])],
            ..RawCountryRecord::default()
        };
        let mut record = normalize(raw, "CN", Locale::En, date());
        let added = append_volunteer(&mut record, VolunteerDraft::named("Mei"), date());

        assert_eq!(added.id, "CN003");
        assert_eq!(added.role, Role::Translator);
        assert_eq!(added.status, Status::Active);
        assert_eq!(added.joined_date, "2024-06-01");
        assert_eq!(record.volunteers.len(), 3);
        assert_eq!(record.stats.total, 3);
        assert_eq!(record.stats.active, 3);
    }

    #[tokio::test]
    async fn test_load_normalizes_code() {
        let source = MemorySource::default().with("CN", raw_with_total(2));
        let store = CountryStore::new(Arc::new(source));
        let loaded = store.load_detailed(" cn ").await;
        assert!(!loaded.is_fallback());
        assert_eq!(loaded.record.country_code, "CN");
        assert_eq!(loaded.record.stats.total, 2);
    }

    #[tokio::test]
    async fn test_load_missing_country_returns_template() {
        let store = CountryStore::new(Arc::new(MemorySource::default()));
        let loaded = store.load_detailed("ZZ").await;
        assert_eq!(loaded.failure, Some(LoadFailure::NotFound));
        assert_eq!(loaded.record.stats.total, 0);
        assert_eq!(loaded.record.country_name, "ZZ");
        assert!(loaded.record.volunteers.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_keeps_reason() {
        let source = MemorySource {
            broken: vec!["US".to_string()],
            ..MemorySource::default()
        };
        let store = CountryStore::new(Arc::new(source)).with_locale(Locale::Zh);
        let loaded = store.load_detailed("us").await;
        assert_eq!(loaded.record.country_name, "美国");
        match loaded.failure {
            Some(LoadFailure::Failed(reason)) => assert!(reason.contains("connection reset")),
            other => panic!("unexpected failure: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_placeholder_code_is_not_fetched() {
        let source = Arc::new(MemorySource::default());
        let store = CountryStore::new(source.clone());
        let loaded = store.load_detailed("--").await;
        assert_eq!(loaded.failure, Some(LoadFailure::InvalidCode));
        assert_eq!(source.fetch_count(), 0);
    }

    #[test]
    fn test_append_volunteer_saturates_counters() {
        let mut record = normalize(raw_with_total(u32::MAX), "IN", Locale::En, date());
        append_volunteer(&mut record, VolunteerDraft::named("Asha"), date());
        assert_eq!(record.stats.total, u32::MAX);
        assert_eq!(record.stats.active, u32::MAX);
        assert_eq!(record.volunteers.len(), 1);
    }

    #[tokio::test]
    async fn test_path_like_codes_are_not_fetched() {
        let source = Arc::new(MemorySource::default());
        let store = CountryStore::new(source.clone());
        for code in ["../escaped", "a/b", "USA", ".."] {
            let loaded = store.load_detailed(code).await;
            assert_eq!(loaded.failure, Some(LoadFailure::InvalidCode), "{}", code);
        }
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_store_add_volunteer() {
        let raw = RawCountryRecord {
            volunteers: vec![volunteer("BR001", &[]), volunteer("BR002", &[])],
            ..RawCountryRecord::default()
        };
        let store = CountryStore::new(Arc::new(MemorySource::default().with("BR", raw)));
        let (record, added) = store.add_volunteer("br", VolunteerDraft::named("Ana")).await;
        assert_eq!(added.id, "BR003");
        assert_eq!(record.stats.total, 3);
    }

    #[tokio::test]
    async fn test_save_on_read_only_source() {
        let store = CountryStore::new(Arc::new(MemorySource::default()));
        let record = store.empty_template("CN");
        let err = store.save(&record).await.unwrap_err();
        assert!(matches!(err, SourceError::ReadOnly(_)));
    }
}
