use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Closed set of response styles understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    Concise,
    Detailed,
    Casual,
    Professional,
    Educational,
    #[default]
    Balanced,
}

impl ResponseStyle {
    pub const ALL: [ResponseStyle; 6] = [
        ResponseStyle::Concise,
        ResponseStyle::Detailed,
        ResponseStyle::Casual,
        ResponseStyle::Professional,
        ResponseStyle::Educational,
        ResponseStyle::Balanced,
    ];

    /// Wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStyle::Concise => "concise",
            ResponseStyle::Detailed => "detailed",
            ResponseStyle::Casual => "casual",
            ResponseStyle::Professional => "professional",
            ResponseStyle::Educational => "educational",
            ResponseStyle::Balanced => "balanced",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResponseStyle::Concise => "Concise",
            ResponseStyle::Detailed => "Detailed",
            ResponseStyle::Casual => "Casual",
            ResponseStyle::Professional => "Professional",
            ResponseStyle::Educational => "Educational",
            ResponseStyle::Balanced => "Balanced",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ResponseStyle::Concise => "Brief and to-the-point",
            ResponseStyle::Detailed => "Comprehensive and thorough",
            ResponseStyle::Casual => "Friendly and conversational",
            ResponseStyle::Professional => "Formal and business-like",
            ResponseStyle::Educational => "Informative with examples",
            ResponseStyle::Balanced => "Well-rounded approach",
        }
    }
}

impl fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == tag)
            .ok_or_else(|| ValidationError::UnknownStyle(s.to_string()))
    }
}

/// Body of `POST /prompt` and `POST /prompt/debug`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPayload {
    pub text: String,
    pub style: ResponseStyle,
    pub skip_refinement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    #[serde(other)]
    Unknown,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub message: String,
    #[serde(default)]
    pub uptime_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelUsage {
    /// Null for log rows written without a model.
    #[serde(default)]
    pub model: Option<String>,
    pub count: u64,
}

impl ModelUsage {
    pub fn name(&self) -> &str {
        self.model.as_deref().unwrap_or("unknown")
    }
}

/// `GET /analytics/stats`. `model_usage` keeps the order the service sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsSnapshot {
    pub total_requests: u64,
    pub requests_24h: u64,
    pub unique_users: u64,
    pub model_usage: Vec<ModelUsage>,
    pub mock_mode: bool,
    pub uptime_seconds: f64,
    #[serde(default)]
    pub database_available: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    #[serde(default)]
    pub authentication: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub mock_mode: Option<bool>,
    #[serde(default)]
    pub uptime_seconds: Option<f64>,
}

/// Error body of any non-2xx reply.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}
