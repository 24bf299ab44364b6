use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use super::entry::CacheEntry;
use crate::models::{CountryRecord, Volunteer, VolunteerDraft};
use crate::store::{append_volunteer, normalize_code, CountryStore, Loaded};

/// Entries are refreshed after 5 minutes
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Read-through cache of normalized country records.
///
/// The lock is never held across a load, so two concurrent misses for the
/// same code may both hit the store; the later insert wins.
pub struct CountryCache {
    store: CountryStore,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl CountryCache {
    pub fn new(store: CountryStore, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl(store: CountryStore) -> Self {
        Self::new(store, DEFAULT_TTL)
    }

    pub fn store(&self) -> &CountryStore {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live entry for a normalized code, if any
    async fn live(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .cloned()
    }

    pub async fn get(&self, code: &str) -> CountryRecord {
        self.get_detailed(code).await.record
    }

    /// Like `get`, but keeps the reason a cached template was synthesized
    pub async fn get_detailed(&self, code: &str) -> Loaded {
        let key = normalize_code(code);
        if let Some(entry) = self.live(&key).await {
            debug!(country = %key, age = %entry.age_display(), "Cache hit");
            return entry.loaded;
        }

        debug!(country = %key, "Cache miss");
        let loaded = self.store.load_detailed(&key).await;
        self.entries
            .write()
            .await
            .insert(key, CacheEntry::new(loaded.clone()));
        loaded
    }

    /// Drop one entry. Returns whether anything was cached.
    pub async fn invalidate(&self, code: &str) -> bool {
        let key = normalize_code(code);
        let removed = self.entries.write().await.remove(&key).is_some();
        debug!(country = %key, removed, "Cache invalidated");
        removed
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Replace the entry for `record`'s country
    pub async fn put(&self, record: CountryRecord) {
        let key = normalize_code(&record.country_code);
        let loaded = Loaded { record, failure: None };
        self.entries.write().await.insert(key, CacheEntry::new(loaded));
    }

    /// Append a volunteer to the cached record and write the result back.
    pub async fn add_volunteer(&self, code: &str, draft: VolunteerDraft) -> (CountryRecord, Volunteer) {
        let mut record = self.get(code).await;
        let volunteer = append_volunteer(&mut record, draft, chrono::Local::now().date_naive());
        self.put(record.clone()).await;
        (record, volunteer)
    }

    /// Human-readable age of a live entry
    pub async fn age(&self, code: &str) -> Option<String> {
        self.live(&normalize_code(code)).await.map(|e| e.age_display())
    }

    /// Number of entries, including expired ones not yet refreshed
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// ============================================================================
// Tests
// ============================================================================
