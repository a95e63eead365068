//! Typed client surface for the compliance-dashboard backend.
//!
//! [`DashboardBackend`] is the seam between the sync core and the network:
//! [`HttpBackend`] talks to the real service, tests substitute an in-process
//! fake.

pub mod envelope;
mod http;
pub mod models;

use std::fmt;

pub use http::HttpBackend;
pub use models::{
    Analytics, AnalysisReport, DocumentSummary, HealthReport, Notification, NotificationKind,
    Overview, Priority, RiskLevel, TimelineEvent, TimelineKind,
};

use crate::cancel::CallContext;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("JSON error: {0}")]
    Decode(String),
    #[error("Invalid request URL: {0}")]
    Url(String),
    #[error("Request cancelled")]
    Cancelled,
}

/// Every backend route the client calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Overview,
    Documents,
    Notifications,
    MarkRead(String),
    Timeline,
    Analytics,
    Analyze(String),
    RefreshAnalytics,
}

impl Endpoint {
    pub fn method(&self) -> &'static str {
        match self {
            Self::MarkRead(_) => "PUT",
            Self::RefreshAnalytics => "POST",
            _ => "GET",
        }
    }

    /// Path segments, unencoded. Ids are a single segment each.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Health => vec!["health"],
            Self::Overview => vec!["api", "dashboard", "overview"],
            Self::Documents => vec!["api", "dashboard", "documents"],
            Self::Notifications => vec!["api", "dashboard", "notifications"],
            Self::MarkRead(id) => vec!["api", "dashboard", "notifications", id.as_str(), "read"],
            Self::Timeline => vec!["api", "dashboard", "timeline"],
            Self::Analytics => vec!["api", "dashboard", "analytics"],
            Self::Analyze(id) => vec!["api", "dashboard", "analyze", id.as_str()],
            Self::RefreshAnalytics => vec!["api", "dashboard", "refresh-analytics"],
        }
    }

    /// Human-readable path used in logs.
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// The five resources merged into one dashboard snapshot, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Overview,
    Documents,
    Notifications,
    Timeline,
    Analytics,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Overview,
        Resource::Documents,
        Resource::Notifications,
        Resource::Timeline,
        Resource::Analytics,
    ];

    pub fn endpoint(self) -> Endpoint {
        match self {
            Self::Overview => Endpoint::Overview,
            Self::Documents => Endpoint::Documents,
            Self::Notifications => Endpoint::Notifications,
            Self::Timeline => Endpoint::Timeline,
            Self::Analytics => Endpoint::Analytics,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Documents => "documents",
            Self::Notifications => "notifications",
            Self::Timeline => "timeline",
            Self::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Operations the sync core needs from the backend.
///
/// Implementations must be shareable across the worker threads the
/// controller spawns. Collection endpoints return an empty `Vec` when the
/// envelope carries no `data`; single-object endpoints return `None`.
pub trait DashboardBackend: Send + Sync {
    fn health(&self, ctx: &CallContext) -> Result<HealthReport, ApiError>;
    fn overview(&self, ctx: &CallContext) -> Result<Option<Overview>, ApiError>;
    fn documents(&self, ctx: &CallContext) -> Result<Vec<DocumentSummary>, ApiError>;
    fn notifications(&self, ctx: &CallContext) -> Result<Vec<Notification>, ApiError>;
    fn timeline(&self, ctx: &CallContext) -> Result<Vec<TimelineEvent>, ApiError>;
    fn analytics(&self, ctx: &CallContext) -> Result<Option<Analytics>, ApiError>;
    fn mark_notification_read(&self, id: &str, ctx: &CallContext) -> Result<(), ApiError>;
    fn analyze_document(
        &self,
        document_id: &str,
        ctx: &CallContext,
    ) -> Result<AnalysisReport, ApiError>;
    fn refresh_analytics(&self, ctx: &CallContext) -> Result<Option<Analytics>, ApiError>;
}
