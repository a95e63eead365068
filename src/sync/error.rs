use std::fmt;

use crate::api::{ApiError, Resource};

/// Side-effecting requests issued by the action trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Analyze,
    RefreshAnalytics,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Analyze => "Document analysis",
            Self::RefreshAnalytics => "Analytics refresh",
        })
    }
}

/// Failures surfaced by the sync core. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The liveness probe failed; no data requests were made.
    #[error("Backend not available: {0}")]
    Connectivity(String),
    /// One of the aggregate requests failed; nothing was applied.
    #[error("Failed to load {resource}: {reason}")]
    AggregateFetch { resource: Resource, reason: String },
    /// A confirming request for an optimistic mutation failed.
    #[error("Could not confirm notification {id} as read: {reason}")]
    MutationConfirm { id: String, reason: String },
    #[error("{action} failed: {reason}")]
    Action { action: ActionKind, reason: String },
    #[error("Request cancelled")]
    Cancelled,
}

impl SyncError {
    pub(crate) fn aggregate(resource: Resource, err: ApiError) -> Self {
        match err {
            ApiError::Cancelled => Self::Cancelled,
            err => Self::AggregateFetch {
                resource,
                reason: err.to_string(),
            },
        }
    }

    pub(crate) fn action(action: ActionKind, err: ApiError) -> Self {
        match err {
            ApiError::Cancelled => Self::Cancelled,
            err => Self::Action {
                action,
                reason: err.to_string(),
            },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
