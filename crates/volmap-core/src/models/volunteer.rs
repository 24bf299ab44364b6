use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use super::null_as_default;
use crate::countries::Locale;

/// What a volunteer does for the project. Unknown strings map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Translator,
    Reviewer,
    Coordinator,
    #[serde(other)]
    Other,
}

impl Role {
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Role::Translator, Locale::En) => "Translator",
            (Role::Reviewer, Locale::En) => "Reviewer",
            (Role::Coordinator, Locale::En) => "Coordinator",
            (Role::Other, Locale::En) => "Other",
            (Role::Translator, Locale::Zh) => "翻译员",
            (Role::Reviewer, Locale::Zh) => "审校员",
            (Role::Coordinator, Locale::Zh) => "协调员",
            (Role::Other, Locale::Zh) => "其他",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Translator => write!(f, "translator"),
            Role::Reviewer => write!(f, "reviewer"),
            Role::Coordinator => write!(f, "coordinator"),
            Role::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "translator" => Ok(Role::Translator),
            "reviewer" => Ok(Role::Reviewer),
            "coordinator" => Ok(Role::Coordinator),
            "other" => Ok(Role::Other),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Activity status. Anything other than "active" reads as `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    #[serde(other)]
    Inactive,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Status::Active, Locale::En) => "Active",
            (Status::Inactive, Locale::En) => "Resting",
            (Status::Active, Locale::Zh) => "活跃",
            (Status::Inactive, Locale::Zh) => "休息",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Volunteer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(rename = "joinedDate", default, deserialize_with = "null_as_default")]
    pub joined_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(rename = "completedTasks", default, deserialize_with = "null_as_default")]
    pub completed_tasks: u32,
}

impl Volunteer {
    /// Language tags with surrounding whitespace removed, blanks dropped
    pub fn trimmed_languages(&self) -> impl Iterator<Item = &str> {
        self.languages
            .iter()
            .map(|lang| lang.trim())
            .filter(|lang| !lang.is_empty())
    }
}

/// Caller-supplied partial volunteer data.
///
/// Every field is optional; `into_volunteer` fills the gaps with the
/// documented defaults:
///
/// | field            | default        |
/// |------------------|----------------|
/// | `name`           | empty          |
/// | `role`           | `translator`   |
/// | `languages`      | empty          |
/// | `location`       | empty          |
/// | `joinedDate`     | today          |
/// | `status`         | `active`       |
/// | `completedTasks` | 0              |
///
/// The id is never taken from the draft; it is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct VolunteerDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "joinedDate", default)]
    pub joined_date: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(rename = "completedTasks", default)]
    pub completed_tasks: Option<u32>,
}

impl VolunteerDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Apply defaults, then override with whatever the caller supplied.
    pub fn into_volunteer(self, id: String, today: NaiveDate) -> Volunteer {
        Volunteer {
            id,
            name: self.name.unwrap_or_default(),
            role: self.role.unwrap_or(Role::Translator),
            languages: self.languages.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            joined_date: self
                .joined_date
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            status: self.status.unwrap_or(Status::Active),
            completed_tasks: self.completed_tasks.unwrap_or(0),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
