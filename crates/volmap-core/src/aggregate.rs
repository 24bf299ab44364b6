//! Global statistics across countries.

use std::collections::BTreeSet;

use futures::future::join_all;
use tracing::debug;

use crate::cache::CountryCache;
use crate::models::{CountryRank, CountryRecord, GlobalStats};
use crate::store::{is_valid_code, normalize_code};

/// Load every requested country through the cache and sum them up.
///
/// Codes are normalized and de-duplicated; anything that is not an ISO-2
/// code (blanks, the `--` placeholder) is skipped. Loads
/// run concurrently. A country that fails to load contributes the zeroed
/// template the store falls back to.
pub async fn compute_global_stats<S: AsRef<str>>(cache: &CountryCache, codes: &[S]) -> GlobalStats {
    let codes: BTreeSet<String> = codes
        .iter()
        .map(|code| normalize_code(code.as_ref()))
        .filter(|code| is_valid_code(code))
        .collect();

    let records = join_all(codes.iter().map(|code| cache.get(code))).await;
    let stats = summarize(&records);
    debug!(
        countries = records.len(),
        total = stats.total_volunteers,
        covered = stats.total_countries,
        "Computed global stats"
    );
    stats
}

/// Combine already-loaded records. Totals saturate at `u32::MAX`.
pub fn summarize(records: &[CountryRecord]) -> GlobalStats {
    let mut ranking: Vec<CountryRank> = records
        .iter()
        .map(|record| CountryRank {
            country_code: record.country_code.clone(),
            country_name: record.country_name.clone(),
            count: record.stats.total,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.country_code.cmp(&b.country_code))
    });

    GlobalStats {
        total_volunteers: records.iter().map(|r| r.stats.total).fold(0, u32::saturating_add),
        active_volunteers: records.iter().map(|r| r.stats.active).fold(0, u32::saturating_add),
        total_countries: records.iter().filter(|r| r.stats.total > 0).count() as u32,
        ranking,
    }
}
