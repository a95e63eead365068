//! Single-threaded owner of the dashboard state.
//!
//! Every network operation runs on a worker thread and reports back through a
//! channel. Nothing touches the [`SnapshotStore`] until the owner calls
//! [`DashboardController::poll_jobs`] or one of the blocking `wait_*` helpers,
//! so each applied result is atomic with respect to readers. Results from
//! different operations may interleave in any order between those calls.

mod actions;
mod background_jobs;
mod jobs;
mod loading;
mod notifications;

use std::sync::Arc;
use std::time::Duration;

use crate::api::{AnalysisReport, DashboardBackend};
use crate::cancel::CallContext;
use crate::clock::Clock;
use crate::config::DashboardConfig;
use crate::sync::{
    AggregateFetcher, FreshnessGate, MergePolicy, Snapshot, SnapshotStore, SyncError,
};

use jobs::ControllerJobs;

/// Tunables for a [`DashboardController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub freshness_ttl: Duration,
    pub merge_policy: MergePolicy,
    pub request_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl ControllerOptions {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            freshness_ttl: config.sync.freshness_ttl(),
            merge_policy: config.sync.merge_policy,
            request_timeout: config.api.request_timeout(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusTone {
    #[default]
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

/// Last user-facing message, for whatever front end sits on top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

/// What happened as a result of applying a worker message.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// An aggregate was applied. `partial` is set when some resources failed.
    SnapshotLoaded { partial: bool },
    LoadFailed(SyncError),
    ReadConfirmed { id: String },
    /// The confirming request failed and the prior `read` value was restored.
    ReadCompensated { id: String, error: SyncError },
    /// The confirming request failed while a later read of the same
    /// notification was still pending, so nothing was restored yet.
    ReadFailed { id: String, error: SyncError },
    AnalysisFinished {
        ticket: u64,
        document_id: String,
        result: Result<AnalysisReport, SyncError>,
    },
    AnalyticsRefreshed,
    AnalyticsRefreshFailed(SyncError),
}

pub struct DashboardController {
    store: SnapshotStore,
    backend: Arc<dyn DashboardBackend>,
    clock: Arc<dyn Clock>,
    gate: FreshnessGate,
    fetcher: AggregateFetcher,
    request_timeout: Duration,
    jobs: ControllerJobs,
    status: StatusLine,
}

impl DashboardController {
    pub fn new(
        backend: Arc<dyn DashboardBackend>,
        clock: Arc<dyn Clock>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            store: SnapshotStore::new(),
            backend,
            clock,
            gate: FreshnessGate::new(options.freshness_ttl),
            fetcher: AggregateFetcher::new(options.merge_policy),
            request_timeout: options.request_timeout,
            jobs: ControllerJobs::new(),
            status: StatusLine::default(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Worker threads that have not reported back yet.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.in_flight()
    }

    fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.status.text = text.into();
        self.status.tone = tone;
    }

    fn call_context(&self, cancel: crate::cancel::CancelToken) -> CallContext {
        CallContext {
            cancel,
            timeout: self.request_timeout,
        }
    }
}
