//! Shared fixtures for unit tests: sample payloads and an in-process backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::api::{
    Analytics, AnalysisReport, ApiError, DashboardBackend, DocumentSummary, Endpoint,
    HealthReport, Notification, NotificationKind, Overview, Priority, RiskLevel, TimelineEvent,
    TimelineKind,
};
use crate::api::models::{ProcessingStats, RiskDistribution, TrendPoint};
use crate::cancel::CallContext;
use crate::sync::AggregateFields;

pub(crate) fn t0() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

pub(crate) fn ctx() -> CallContext {
    CallContext::new(Duration::from_secs(5))
}

pub(crate) fn sample_overview() -> Overview {
    Overview {
        total_documents: 2,
        processed_documents: 1,
        compliance_rate: 50.0,
        average_score: 81.5,
        high_risk_items: 1,
        processing_time: 2450.0,
        backend_health: "healthy".into(),
        last_updated: Some("2025-01-05T10:00:00".into()),
    }
}

pub(crate) fn sample_document(id: &str, status: &str) -> DocumentSummary {
    DocumentSummary {
        id: id.into(),
        file_name: format!("{id}.pdf"),
        file_size: Some("1.2 MB".into()),
        overall_score: 81.5,
        risk_level: RiskLevel::Medium,
        status: status.into(),
        total_clauses: 12,
        compliance_rate: 75.0,
        uploaded_at: Some("2025-01-05T09:00:00".into()),
        processed_at: None,
    }
}

/// `n1` is a high-priority warning, `n2` an info notice, anything else a success.
pub(crate) fn sample_notification(id: &str, read: bool) -> Notification {
    let (kind, priority) = match id {
        "n1" => (NotificationKind::Warning, Priority::High),
        "n2" => (NotificationKind::Info, Priority::Low),
        _ => (NotificationKind::Success, Priority::Medium),
    };
    Notification {
        id: id.into(),
        kind,
        title: format!("Notification {id}"),
        message: String::new(),
        timestamp: "2025-01-05T10:00:00".into(),
        read,
        priority,
        document_id: None,
    }
}

pub(crate) fn sample_timeline_event(id: &str) -> TimelineEvent {
    TimelineEvent {
        id: id.into(),
        kind: TimelineKind::Upload,
        title: "Document uploaded".into(),
        description: format!("{id} uploaded"),
        timestamp: "2025-01-05T09:00:00".into(),
        status: "completed".into(),
        document_id: None,
    }
}

pub(crate) fn sample_analytics(score: f64) -> Analytics {
    Analytics {
        compliance_trend: vec![TrendPoint {
            date: "2025-01-05".into(),
            score,
        }],
        risk_distribution: RiskDistribution {
            high: 1,
            medium: 1,
            low: 0,
            compliant: 0,
        },
        processing_stats: ProcessingStats {
            average_time: 2450.0,
            success_rate: 100.0,
            total_processed: 2,
        },
        compliance_areas: BTreeMap::from([("Legal Compliance".to_string(), score)]),
        last_updated: None,
    }
}

pub(crate) fn sample_fields() -> AggregateFields {
    AggregateFields {
        overview: Some(sample_overview()),
        documents: vec![
            sample_document("doc1", "completed"),
            sample_document("doc2", "processing"),
        ],
        notifications: vec![
            sample_notification("n1", false),
            sample_notification("n2", false),
            sample_notification("n3", true),
        ],
        timeline: vec![sample_timeline_event("e1")],
        analytics: Some(sample_analytics(85.0)),
    }
}

/// What [`FakeBackend`] serves. Tests mutate it between calls.
#[derive(Debug, Clone)]
pub(crate) struct FakeState {
    pub(crate) health: HealthReport,
    pub(crate) fields: AggregateFields,
    pub(crate) refreshed_analytics: Option<Analytics>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            health: HealthReport {
                status: "healthy".into(),
                ..HealthReport::default()
            },
            fields: sample_fields(),
            refreshed_analytics: Some(sample_analytics(90.0)),
        }
    }
}

/// Scripted [`DashboardBackend`] that records every call.
///
/// A call on a held endpoint blocks until the sender returned by
/// [`FakeBackend::hold`] sends or is dropped. Like the HTTP backend, a call
/// whose token is already cancelled fails without being recorded.
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
    failures: Mutex<HashMap<Endpoint, ApiError>>,
    holds: Mutex<HashMap<Endpoint, Receiver<()>>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn update(&self, change: impl FnOnce(&mut FakeState)) {
        change(&mut self.state.lock().unwrap());
    }

    pub(crate) fn snapshot_fields(&self) -> AggregateFields {
        self.state.lock().unwrap().fields.clone()
    }

    pub(crate) fn fail(&self, endpoint: Endpoint, err: ApiError) {
        self.failures.lock().unwrap().insert(endpoint, err);
    }

    /// Block the next call to `endpoint` until the returned sender fires or drops.
    pub(crate) fn hold(&self, endpoint: Endpoint) -> Sender<()> {
        let (tx, rx) = channel();
        self.holds.lock().unwrap().insert(endpoint, rx);
        tx
    }

    pub(crate) fn call_count(&self, endpoint: &Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == endpoint)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Spin until `endpoint` has been called at least once.
    pub(crate) fn wait_for_call(&self, endpoint: &Endpoint) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.call_count(endpoint) == 0 {
            assert!(Instant::now() < deadline, "timed out waiting for {endpoint}");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn respond<T>(
        &self,
        endpoint: Endpoint,
        ctx: &CallContext,
        read: impl FnOnce(&FakeState) -> T,
    ) -> Result<T, ApiError> {
        if ctx.cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        self.calls.lock().unwrap().push(endpoint.clone());
        let hold = self.holds.lock().unwrap().remove(&endpoint);
        if let Some(gate) = hold {
            let _ = gate.recv();
        }
        if let Some(err) = self.failures.lock().unwrap().get(&endpoint).cloned() {
            return Err(err);
        }
        Ok(read(&self.state.lock().unwrap()))
    }
}

impl DashboardBackend for FakeBackend {
    fn health(&self, ctx: &CallContext) -> Result<HealthReport, ApiError> {
        self.respond(Endpoint::Health, ctx, |state| state.health.clone())
    }

    fn overview(&self, ctx: &CallContext) -> Result<Option<Overview>, ApiError> {
        self.respond(Endpoint::Overview, ctx, |state| state.fields.overview.clone())
    }

    fn documents(&self, ctx: &CallContext) -> Result<Vec<DocumentSummary>, ApiError> {
        self.respond(Endpoint::Documents, ctx, |state| state.fields.documents.clone())
    }

    fn notifications(&self, ctx: &CallContext) -> Result<Vec<Notification>, ApiError> {
        self.respond(Endpoint::Notifications, ctx, |state| {
            state.fields.notifications.clone()
        })
    }

    fn timeline(&self, ctx: &CallContext) -> Result<Vec<TimelineEvent>, ApiError> {
        self.respond(Endpoint::Timeline, ctx, |state| state.fields.timeline.clone())
    }

    fn analytics(&self, ctx: &CallContext) -> Result<Option<Analytics>, ApiError> {
        self.respond(Endpoint::Analytics, ctx, |state| state.fields.analytics.clone())
    }

    fn mark_notification_read(&self, id: &str, ctx: &CallContext) -> Result<(), ApiError> {
        self.respond(Endpoint::MarkRead(id.to_string()), ctx, |_| ())
    }

    fn analyze_document(
        &self,
        document_id: &str,
        ctx: &CallContext,
    ) -> Result<AnalysisReport, ApiError> {
        self.respond(Endpoint::Analyze(document_id.to_string()), ctx, |_| {
            AnalysisReport(serde_json::json!({
                "documentId": document_id,
                "status": "completed",
                "overallScore": 88,
            }))
        })
    }

    fn refresh_analytics(&self, ctx: &CallContext) -> Result<Option<Analytics>, ApiError> {
        self.respond(Endpoint::RefreshAnalytics, ctx, |state| {
            state.refreshed_analytics.clone()
        })
    }
}
