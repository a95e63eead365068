//! Liveness probe plus concurrent fan-out over the five dashboard resources.

use std::thread::ScopedJoinHandle;

use serde::{Deserialize, Serialize};

use crate::api::{
    Analytics, ApiError, DashboardBackend, DocumentSummary, HealthReport, Notification, Overview,
    Resource, TimelineEvent,
};
use crate::cancel::CallContext;

use super::SyncError;

/// How per-resource failures are merged into the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Any failure aborts the whole aggregate; nothing is applied.
    #[default]
    FailFast,
    /// Successful resources are applied, failed ones keep their prior value.
    #[serde(rename = "partial", alias = "partial-success")]
    PartialSuccess,
}

/// The five data fields of a snapshot, fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateFields {
    pub overview: Option<Overview>,
    pub documents: Vec<DocumentSummary>,
    pub notifications: Vec<Notification>,
    pub timeline: Vec<TimelineEvent>,
    pub analytics: Option<Analytics>,
}

/// Settled result of each concurrent request.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResults {
    pub overview: Result<Option<Overview>, ApiError>,
    pub documents: Result<Vec<DocumentSummary>, ApiError>,
    pub notifications: Result<Vec<Notification>, ApiError>,
    pub timeline: Result<Vec<TimelineEvent>, ApiError>,
    pub analytics: Result<Option<Analytics>, ApiError>,
}

impl FieldResults {
    /// Failed resources in canonical order.
    pub fn failures(&self) -> Vec<(Resource, &ApiError)> {
        let errors = [
            (Resource::Overview, self.overview.as_ref().err()),
            (Resource::Documents, self.documents.as_ref().err()),
            (Resource::Notifications, self.notifications.as_ref().err()),
            (Resource::Timeline, self.timeline.as_ref().err()),
            (Resource::Analytics, self.analytics.as_ref().err()),
        ];
        errors
            .into_iter()
            .filter_map(|(resource, err)| err.map(|err| (resource, err)))
            .collect()
    }

    /// All-or-nothing view: the first failure in canonical order wins.
    pub fn into_complete(self) -> Result<AggregateFields, SyncError> {
        Ok(AggregateFields {
            overview: self
                .overview
                .map_err(|err| SyncError::aggregate(Resource::Overview, err))?,
            documents: self
                .documents
                .map_err(|err| SyncError::aggregate(Resource::Documents, err))?,
            notifications: self
                .notifications
                .map_err(|err| SyncError::aggregate(Resource::Notifications, err))?,
            timeline: self
                .timeline
                .map_err(|err| SyncError::aggregate(Resource::Timeline, err))?,
            analytics: self
                .analytics
                .map_err(|err| SyncError::aggregate(Resource::Analytics, err))?,
        })
    }

    pub fn into_partial(self) -> PartialAggregate {
        let failures = self
            .failures()
            .into_iter()
            .map(|(resource, err)| (resource, err.to_string()))
            .collect();
        PartialAggregate {
            overview: self.overview.ok(),
            documents: self.documents.ok(),
            notifications: self.notifications.ok(),
            timeline: self.timeline.ok(),
            analytics: self.analytics.ok(),
            failures,
        }
    }
}

/// Fields that loaded under [`MergePolicy::PartialSuccess`]. `None` means the
/// resource failed and the store keeps what it had.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialAggregate {
    pub overview: Option<Option<Overview>>,
    pub documents: Option<Vec<DocumentSummary>>,
    pub notifications: Option<Vec<Notification>>,
    pub timeline: Option<Vec<TimelineEvent>>,
    pub analytics: Option<Option<Analytics>>,
    pub failures: Vec<(Resource, String)>,
}

impl PartialAggregate {
    /// One-line summary suitable for the snapshot's `error` field.
    pub fn failure_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|(resource, reason)| format!("{resource}: {reason}"))
            .collect();
        Some(format!("Partially loaded dashboard ({})", parts.join("; ")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    Complete(AggregateFields),
    Partial(PartialAggregate),
}

/// Runs the probe and fan-out, then merges according to its policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateFetcher {
    policy: MergePolicy,
}

impl AggregateFetcher {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn run<B>(&self, backend: &B, ctx: &CallContext) -> Result<AggregateOutcome, SyncError>
    where
        B: DashboardBackend + ?Sized,
    {
        let results = fetch_each(backend, ctx)?;
        let failed = results.failures().len();
        match self.policy {
            MergePolicy::PartialSuccess if failed > 0 && failed < Resource::ALL.len() => {
                let partial = results.into_partial();
                tracing::warn!(
                    "Dashboard partially loaded; failed: {}",
                    partial
                        .failures
                        .iter()
                        .map(|(resource, _)| resource.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                Ok(AggregateOutcome::Partial(partial))
            }
            _ => results.into_complete().map(AggregateOutcome::Complete),
        }
    }
}

/// Fail-fast aggregate: probe, fan out, and return all five fields or the first failure.
pub fn fetch_all<B>(backend: &B, ctx: &CallContext) -> Result<AggregateFields, SyncError>
where
    B: DashboardBackend + ?Sized,
{
    fetch_each(backend, ctx)?.into_complete()
}

/// Probe, then issue the five requests concurrently and wait for all to settle.
pub fn fetch_each<B>(backend: &B, ctx: &CallContext) -> Result<FieldResults, SyncError>
where
    B: DashboardBackend + ?Sized,
{
    if ctx.cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }
    let health = probe(backend, ctx)?;
    tracing::debug!("Backend reachable (status '{}')", health.status);
    if ctx.cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    let results = std::thread::scope(|scope| {
        let overview = scope.spawn(|| backend.overview(ctx));
        let documents = scope.spawn(|| backend.documents(ctx));
        let notifications = scope.spawn(|| backend.notifications(ctx));
        let timeline = scope.spawn(|| backend.timeline(ctx));
        let analytics = scope.spawn(|| backend.analytics(ctx));
        FieldResults {
            overview: settle(overview),
            documents: settle(documents),
            notifications: settle(notifications),
            timeline: settle(timeline),
            analytics: settle(analytics),
        }
    });

    if ctx.cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }
    for (resource, err) in results.failures() {
        tracing::warn!("Dashboard {resource} request failed: {err}");
    }
    Ok(results)
}

/// Liveness check that gates the data requests.
pub fn probe<B>(backend: &B, ctx: &CallContext) -> Result<HealthReport, SyncError>
where
    B: DashboardBackend + ?Sized,
{
    match backend.health(ctx) {
        Ok(report) if report.is_unhealthy() => Err(SyncError::Connectivity(
            report
                .message
                .unwrap_or_else(|| "backend reported unhealthy".to_string()),
        )),
        Ok(report) => Ok(report),
        Err(ApiError::Cancelled) => Err(SyncError::Cancelled),
        Err(err) => Err(SyncError::Connectivity(err.to_string())),
    }
}

fn settle<T>(handle: ScopedJoinHandle<'_, Result<T, ApiError>>) -> Result<T, ApiError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ApiError::Transport("request worker panicked".to_string())))
}
