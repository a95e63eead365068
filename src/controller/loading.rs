use std::sync::Arc;

use super::jobs::{AggregateJobResult, JobMessage};
use super::{DashboardController, DashboardEvent, StatusTone};
use crate::sync::AggregateOutcome;

impl DashboardController {
    /// Start an aggregate load unless the snapshot is still fresh.
    ///
    /// Returns false when the freshness gate skipped the load; nothing is sent
    /// to the backend in that case. A load started while another is in flight
    /// supersedes it.
    pub fn load(&mut self, force: bool) -> bool {
        let snapshot = self.store.snapshot();
        let should_fetch = self.gate.should_fetch(
            self.clock.now(),
            snapshot.last_updated,
            self.store.has_overview(),
            snapshot.is_loading,
            force,
        );
        if !should_fetch {
            tracing::debug!("Dashboard snapshot still fresh; skipping load");
            return false;
        }
        self.start_aggregate();
        true
    }

    /// Manual refresh: always loads.
    pub fn refresh(&mut self) -> bool {
        self.load(true)
    }

    pub fn is_loading(&self) -> bool {
        self.store.snapshot().is_loading
    }

    pub(super) fn start_aggregate(&mut self) {
        let job = self.jobs.begin_aggregate();
        self.store.begin_load();
        self.set_status("Loading dashboard", StatusTone::Busy);
        let backend = Arc::clone(&self.backend);
        let fetcher = self.fetcher;
        let ctx = self.call_context(job.cancel);
        let generation = job.generation;
        tracing::info!("Starting dashboard load (generation {generation})");
        self.jobs.spawn(move || {
            JobMessage::AggregateFinished(AggregateJobResult {
                generation,
                result: fetcher.run(backend.as_ref(), &ctx),
            })
        });
    }

    pub(super) fn apply_aggregate_finished(
        &mut self,
        message: AggregateJobResult,
        events: &mut Vec<DashboardEvent>,
    ) {
        if !self.jobs.finish_aggregate(message.generation) {
            tracing::debug!(
                "Discarding result of superseded aggregate generation {}",
                message.generation
            );
            return;
        }
        match message.result {
            Ok(AggregateOutcome::Complete(fields)) => {
                let documents = fields.documents.len();
                let notifications = fields.notifications.len();
                self.store.replace(fields, self.clock.now());
                self.settle_loading_flag();
                tracing::info!(
                    "Dashboard loaded: {documents} documents, {notifications} notifications"
                );
                self.set_status(
                    format!(
                        "Dashboard updated: {documents} documents, {notifications} notifications"
                    ),
                    StatusTone::Info,
                );
                events.push(DashboardEvent::SnapshotLoaded { partial: false });
            }
            Ok(AggregateOutcome::Partial(partial)) => {
                let summary = partial.failure_summary().unwrap_or_default();
                self.store.apply_partial(partial);
                self.settle_loading_flag();
                self.set_status(summary, StatusTone::Warning);
                events.push(DashboardEvent::SnapshotLoaded { partial: true });
            }
            Err(err) => {
                tracing::warn!("Dashboard load failed: {err}");
                self.store.fail_load(err.to_string());
                self.settle_loading_flag();
                self.set_status(err.to_string(), StatusTone::Error);
                events.push(DashboardEvent::LoadFailed(err));
            }
        }
    }
}
