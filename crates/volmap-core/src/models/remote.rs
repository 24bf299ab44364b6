// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::volunteer::{Role, Status, Volunteer};

/// Response envelope used by every backend endpoint.
///
/// Error responses carry `error` either as a string or as
/// `{ "message": ... }`, depending on which handler produced them.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<serde_json::Value>,
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    /// Best human-readable reason for a failed envelope
    pub fn failure_reason(&self) -> String {
        if let Some(ref message) = self.message {
            return message.clone();
        }
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            None => "request was not successful".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub pages: u32,
}

/// Query parameters for `GET /volunteers`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VolunteerFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl VolunteerFilter {
    pub fn region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiLocation {
    pub country: Option<String>,
    pub city: Option<String>,
}

/// A volunteer document as stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiVolunteer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "chineseName", skip_serializing_if = "Option::is_none")]
    pub chinese_name: Option<String>,
    #[serde(rename = "englishName", skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(rename = "totalHours", skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    #[serde(rename = "serviceCount", skip_serializing_if = "Option::is_none")]
    pub service_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "joinDate", skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
    #[serde(rename = "currentLocation", skip_serializing_if = "Option::is_none")]
    pub current_location: Option<ApiLocation>,
}

impl ApiVolunteer {
    /// "中文名 (English Name)" when both are present, otherwise whichever exists
    pub fn full_name(&self) -> String {
        match (self.chinese_name.as_deref(), self.english_name.as_deref()) {
            (Some(zh), Some(en)) if !zh.is_empty() && !en.is_empty() => format!("{} ({})", zh, en),
            (Some(zh), _) if !zh.is_empty() => zh.to_string(),
            (_, Some(en)) => en.to_string(),
            _ => String::new(),
        }
    }

    /// The map's role for this volunteer, taken from the first service that maps to one
    pub fn role(&self) -> Role {
        self.services
            .iter()
            .find_map(|service| match service.as_str() {
                "translation" => Some(Role::Translator),
                "proofreading" => Some(Role::Reviewer),
                "management" => Some(Role::Coordinator),
                _ => None,
            })
            .unwrap_or(Role::Other)
    }

    /// Convert to the map's volunteer shape
    pub fn to_volunteer(&self) -> Volunteer {
        let location = self
            .current_location
            .as_ref()
            .map(|loc| {
                [loc.city.as_deref(), loc.country.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        Volunteer {
            id: self.id.clone().unwrap_or_default(),
            name: self.full_name(),
            role: self.role(),
            languages: Vec::new(),
            location,
            joined_date: self
                .join_date
                .as_deref()
                .map(|d| d.chars().take(10).collect())
                .unwrap_or_default(),
            status: match self.status.as_deref() {
                Some("active") => Status::Active,
                _ => Status::Inactive,
            },
            completed_tasks: self.service_count.unwrap_or(0),
        }
    }
}

/// `GET /stats/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "totalVolunteers", default)]
    pub total_volunteers: u32,
    #[serde(rename = "activeVolunteers", default)]
    pub active_volunteers: u32,
    #[serde(rename = "inactiveVolunteers", default)]
    pub inactive_volunteers: u32,
    #[serde(rename = "totalServiceHours", default)]
    pub total_service_hours: f64,
    #[serde(rename = "totalServiceCount", default)]
    pub total_service_count: u32,
    #[serde(rename = "avgHoursPerVolunteer", default)]
    pub avg_hours_per_volunteer: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_volunteer_conversion() {
        let json = r#"{
            "id": "VM-0007",
            "chineseName": "王芳",
            "englishName": "Fang Wang",
            "status": "pending",
            "region": "CN",
            "services": ["technical", "proofreading"],
            "serviceCount": 9,
            "joinDate": "2023-06-01T00:00:00.000Z",
            "currentLocation": {"country": "China", "city": "Chengdu"}
        }"#;
        let api: ApiVolunteer = serde_json::from_str(json).unwrap();
        let v = api.to_volunteer();
        assert_eq!(v.name, "王芳 (Fang Wang)");
        assert_eq!(v.role, Role::Reviewer);
        assert_eq!(v.status, Status::Inactive);
        assert_eq!(v.location, "Chengdu, China");
        assert_eq!(v.joined_date, "2023-06-01");
        assert_eq!(v.completed_tasks, 9);
    }

    #[test]
    fn test_envelope_failure_reason_variants() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": false, "error": "Volunteer not found"}"#).unwrap();
        assert_eq!(env.failure_reason(), "Volunteer not found");

        let env: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": false, "error": {"message": "boom"}}"#).unwrap();
        assert_eq!(env.failure_reason(), "boom");
    }

    #[test]
    fn test_filter_skips_unset_fields() {
        let filter = VolunteerFilter::region("US");
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"region": "US"}));
    }
}
