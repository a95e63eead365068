//! Wire schemas for the dashboard resources.
//!
//! Field names follow the backend's camelCase JSON. Every field that the
//! backend may omit carries a default so a sparse payload still decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Headline metrics shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_documents: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed_documents: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub compliance_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub high_risk_items: u64,
    /// Average processing time in milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing_time: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backend_health: String,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Decode an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Risk bucket assigned to a processed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    Compliant,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One row of the documents list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_level: RiskLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_clauses: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub compliance_rate: f64,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

impl DocumentSummary {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Server-generated notification. Only `read` is ever changed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Upload,
    Processing,
    Completed,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: TimelineKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub low: u64,
    #[serde(default)]
    pub compliant: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    #[serde(default)]
    pub average_time: f64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub total_processed: u64,
}

/// Aggregated analytics for charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    #[serde(default)]
    pub compliance_trend: Vec<TrendPoint>,
    #[serde(default)]
    pub risk_distribution: RiskDistribution,
    #[serde(default)]
    pub processing_stats: ProcessingStats,
    /// Score per compliance area, keyed by area label.
    #[serde(default)]
    pub compliance_areas: BTreeMap<String, f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Result of a per-document analysis, passed through to the caller as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisReport(pub serde_json::Value);

/// Body of the `/health` probe. Not wrapped in the usual envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthReport {
    pub fn is_unhealthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("unhealthy")
    }
}
