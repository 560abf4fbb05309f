//! # API Models
//!
//! Resource types returned by the Square Cloud API, deserialized from the
//! unwrapped `response` payload.

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer};

/// Regex to extract network figures. The API returns them formatted.
fn network_re() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?\s*[KMGT]?B").expect("invalid network regex"))
}

/// Application entry as listed under the user's account.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialApplication {
    pub id: String,
    #[serde(rename = "tag")]
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: Option<String>,
    pub ram: u32,
    pub lang: String,
    pub cluster: String,
    #[serde(rename = "isWebsite")]
    pub is_website: bool,
}

/// Full application record.
#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: Option<String>,
    pub cluster: String,
    pub ram: u32,
    pub language: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub custom: Option<String>,
    #[serde(rename = "isWebsite")]
    pub is_website: bool,
    #[serde(rename = "gitIntegration", default)]
    pub git_integration: bool,
}

/// Point-in-time resource usage of an application.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationStatus {
    pub cpu: String,
    pub ram: String,
    pub status: String,
    pub running: bool,
    pub storage: String,
    pub network: ApplicationNetwork,
    #[serde(default)]
    pub requests: u64,
    #[serde(default, deserialize_with = "uptime_millis")]
    pub uptime: Option<DateTime<Utc>>,
}

/// Status entry from the all-apps status route.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialApplicationStatus {
    pub id: String,
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub ram: Option<String>,
    pub running: bool,
}

/// Network usage as formatted strings, e.g. `"1.2 MB ↑ 340 KB ↓"`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationNetwork {
    pub total: String,
    pub now: String,
}

/// Up/down figures extracted from one of the API's formatted network
/// strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkUsage {
    pub up: String,
    pub down: String,
}

impl NetworkUsage {
    /// Parse a formatted string; figures default to `0KB` when absent.
    pub fn parse(raw: &str) -> Self {
        let mut matches = network_re()
            .find_iter(raw)
            .map(|m| m.as_str().replace(' ', ""));
        Self {
            up: matches.next().unwrap_or_else(|| "0KB".to_string()),
            down: matches.next().unwrap_or_else(|| "0KB".to_string()),
        }
    }
}

impl std::fmt::Display for NetworkUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ↑ {} ↓", self.up, self.down)
    }
}

/// The authenticated user's account, as returned by `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(rename = "user")]
    pub account: Account,
    #[serde(rename = "applications", default)]
    pub apps: Vec<PartialApplication>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub tag: String,
    #[serde(default)]
    pub email: Option<String>,
    pub plan: Plan,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    pub name: String,
    pub memory: PlanMemory,
    #[serde(default, deserialize_with = "uptime_millis")]
    pub duration: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanMemory {
    pub limit: u64,
    pub available: u64,
    pub used: u64,
}

/// Result of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedApplication {
    pub id: String,
    #[serde(rename = "tag")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
    pub ram: u32,
    pub cpu: u32,
    pub language: ApplicationLanguage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationLanguage {
    pub name: String,
    pub version: String,
}

/// Service-wide statistics, available without authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceStatistics {
    pub worker: u64,
    #[serde(rename = "statistics")]
    pub stats: ServiceCounts,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCounts {
    pub users: u64,
    pub apps: u64,
    pub websites: u64,
    pub ping: u64,
}

/// Millisecond epoch timestamps; `0` and `null` both mean "not running".
fn uptime_millis<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis: Option<i64> = Option::deserialize(deserializer)?;
    Ok(millis
        .filter(|&ms| ms > 0)
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_usage_parses_formatted_strings() {
        let usage = NetworkUsage::parse("1.5 MB ↑ 340 KB ↓");
        assert_eq!(usage.up, "1.5MB");
        assert_eq!(usage.down, "340KB");
        assert_eq!(usage.to_string(), "1.5MB ↑ 340KB ↓");
    }

    #[test]
    fn network_usage_defaults_to_zero() {
        let usage = NetworkUsage::parse("");
        assert_eq!(usage.up, "0KB");
        assert_eq!(usage.down, "0KB");
    }

    #[test]
    fn status_deserializes_with_zero_uptime() {
        let json = r#"{
            "cpu": "0.00%",
            "ram": "12MB",
            "status": "exited",
            "running": false,
            "storage": "1MB",
            "network": {"total": "0KB ↑ 0KB ↓", "now": "0KB ↑ 0KB ↓"},
            "requests": 0,
            "uptime": 0
        }"#;
        let status: ApplicationStatus = serde_json::from_str(json).unwrap();
        assert!(!status.running);
        assert!(status.uptime.is_none());
    }

    #[test]
    fn status_deserializes_with_uptime() {
        let json = r#"{
            "cpu": "1.20%",
            "ram": "80MB",
            "status": "running",
            "running": true,
            "storage": "10MB",
            "network": {"total": "5 MB ↑ 2 MB ↓", "now": "1 KB ↑ 1 KB ↓"},
            "requests": 42,
            "uptime": 1700000000000
        }"#;
        let status: ApplicationStatus = serde_json::from_str(json).unwrap();
        assert!(status.running);
        assert_eq!(status.uptime.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn user_payload_maps_tag_and_applications() {
        let json = r#"{
            "user": {
                "id": "1",
                "tag": "joe",
                "email": "joe@example.com",
                "plan": {
                    "name": "free",
                    "memory": {"limit": 512, "available": 256, "used": 256},
                    "duration": null
                }
            },
            "applications": [
                {"id": "a1", "tag": "my-bot", "ram": 256, "lang": "javascript",
                 "cluster": "florida-1", "isWebsite": false}
            ]
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.account.tag, "joe");
        assert_eq!(user.apps.len(), 1);
        assert_eq!(user.apps[0].name, "my-bot");
        assert!(!user.apps[0].is_website);
    }

    #[test]
    fn uploaded_application_deserializes() {
        let json = r#"{
            "id": "abc123",
            "tag": "uploaded-app",
            "subdomain": null,
            "ram": 256,
            "cpu": 1,
            "language": {"name": "javascript", "version": "recommended"}
        }"#;
        let uploaded: UploadedApplication = serde_json::from_str(json).unwrap();
        assert_eq!(uploaded.id, "abc123");
        assert_eq!(uploaded.language.name, "javascript");
    }
}
