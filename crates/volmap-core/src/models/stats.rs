use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// One row of the per-country ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CountryRank {
    #[serde(rename = "countryCode")]
    pub country_code: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    pub count: u32,
}

/// Totals across every requested country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GlobalStats {
    #[serde(rename = "totalVolunteers")]
    pub total_volunteers: u32,
    #[serde(rename = "activeVolunteers")]
    pub active_volunteers: u32,
    /// Countries with at least one volunteer
    #[serde(rename = "totalCountries")]
    pub total_countries: u32,
    /// Sorted by count descending, then country code ascending
    pub ranking: Vec<CountryRank>,
}

impl GlobalStats {
    /// The first `n` ranking entries
    pub fn top(&self, n: usize) -> &[CountryRank] {
        &self.ranking[..n.min(self.ranking.len())]
    }
}
