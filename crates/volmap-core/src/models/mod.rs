//! Data models for the volunteer map.
//!
//! This module contains the structures that travel over the wire and
//! through the cache:
//!
//! - `CountryRecord`, `Stats`: normalized per-country datasets
//! - `RawCountryRecord`, `RawStats`: the lenient shape accepted from data files
//! - `Volunteer`, `VolunteerDraft`, `Role`, `Status`: volunteer entries
//! - `GlobalStats`, `CountryRank`: aggregate statistics across countries
//! - `ApiVolunteer`, `Envelope`, `SummaryStats`: backend REST shapes

pub mod country;
pub mod remote;
pub mod stats;
pub mod volunteer;

pub use country::{CountryRecord, RawCountryRecord, RawStats, Stats};
pub use remote::{ApiLocation, ApiVolunteer, Envelope, Pagination, SummaryStats, VolunteerFilter};
pub use stats::{CountryRank, GlobalStats};
pub use volunteer::{Role, Status, Volunteer, VolunteerDraft};

use serde::{Deserialize, Deserializer};

/// Deserialize a field where `null` means the same thing as "absent".
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
