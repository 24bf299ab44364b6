use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::store::Loaded;

/// One cached country, with the time it was inserted
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub loaded: Loaded,
    /// Wall-clock insertion time, for display
    pub cached_at: DateTime<Utc>,
    inserted: Instant,
}

impl CacheEntry {
    pub fn new(loaded: Loaded) -> Self {
        Self {
            loaded,
            cached_at: Utc::now(),
            inserted: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.inserted.elapsed()
    }

    pub fn age_minutes(&self) -> u64 {
        self.age().as_secs() / 60
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    /// Entries older than `ttl` are treated as misses
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::Locale;
    use crate::store::empty_template;
    use chrono::NaiveDate;

    fn entry() -> CacheEntry {
        let record = empty_template("CN", Locale::En, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        CacheEntry::new(Loaded { record, failure: None })
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_entry_age_display() {
        let cached = entry();
        assert_eq!(cached.age_display(), "just now");

        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        assert_eq!(cached.age_display(), "5m ago");

        tokio::time::advance(Duration::from_secs(85 * 60)).await;
        assert_eq!(cached.age_display(), "2h ago");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_entry_is_expired() {
        let cached = entry();
        let ttl = Duration::from_secs(300);
        assert!(!cached.is_expired(ttl));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(!cached.is_expired(ttl));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cached.is_expired(ttl));
    }
}
