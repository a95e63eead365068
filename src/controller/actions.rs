use std::sync::Arc;

use super::jobs::{AnalysisJobResult, AnalyticsRefreshResult, JobMessage, PendingAnalysis};
use super::{DashboardController, DashboardEvent, StatusTone};
use crate::cancel::CancelToken;
use crate::sync::actions;

impl DashboardController {
    /// Request analysis of `document_id`. The returned ticket identifies the
    /// matching [`DashboardEvent::AnalysisFinished`]. A successful analysis
    /// is followed by a forced reload.
    pub fn analyze(&mut self, document_id: &str) -> u64 {
        let ticket = self.jobs.next_id();
        let cancel = CancelToken::new();
        let backend = Arc::clone(&self.backend);
        let ctx = self.call_context(cancel.clone());
        let document_id = document_id.to_string();
        self.jobs.analyses.insert(
            ticket,
            PendingAnalysis {
                document_id: document_id.clone(),
                cancel,
            },
        );
        self.set_status(format!("Analyzing {document_id}"), StatusTone::Busy);
        self.jobs.spawn(move || {
            let result = actions::analyze(backend.as_ref(), &document_id, &ctx);
            JobMessage::AnalysisFinished(AnalysisJobResult {
                ticket,
                document_id,
                result,
            })
        });
        ticket
    }

    /// Ask the backend to recompute analytics and patch only that field.
    pub fn refresh_analytics(&mut self) {
        let job = self.jobs.begin_analytics_refresh();
        self.store.begin_analytics_refresh();
        self.set_status("Refreshing analytics", StatusTone::Busy);
        let backend = Arc::clone(&self.backend);
        let ctx = self.call_context(job.cancel);
        let generation = job.generation;
        self.jobs.spawn(move || {
            JobMessage::AnalyticsRefreshed(AnalyticsRefreshResult {
                generation,
                result: actions::refresh_analytics(backend.as_ref(), &ctx),
            })
        });
    }

    pub(super) fn apply_analysis_finished(
        &mut self,
        message: AnalysisJobResult,
        events: &mut Vec<DashboardEvent>,
    ) {
        if self.jobs.analyses.remove(&message.ticket).is_none() {
            return;
        }
        let AnalysisJobResult {
            ticket,
            document_id,
            result,
        } = message;
        let succeeded = result.is_ok();
        match &result {
            Ok(_) => self.set_status(
                format!("Analysis complete for {document_id}"),
                StatusTone::Info,
            ),
            Err(err) => {
                tracing::warn!("Analysis of {document_id} failed: {err}");
                self.set_status(err.to_string(), StatusTone::Error);
            }
        }
        events.push(DashboardEvent::AnalysisFinished {
            ticket,
            document_id,
            result,
        });
        if succeeded {
            self.start_aggregate();
        }
    }

    pub(super) fn apply_analytics_refreshed(
        &mut self,
        message: AnalyticsRefreshResult,
        events: &mut Vec<DashboardEvent>,
    ) {
        if !self.jobs.finish_analytics_refresh(message.generation) {
            return;
        }
        match message.result {
            Ok(analytics) => {
                self.store.patch_analytics(analytics, self.clock.now());
                self.settle_loading_flag();
                self.set_status("Analytics refreshed", StatusTone::Info);
                events.push(DashboardEvent::AnalyticsRefreshed);
            }
            Err(err) => {
                tracing::warn!("{err}");
                self.store.fail_analytics_refresh();
                self.settle_loading_flag();
                self.set_status(err.to_string(), StatusTone::Error);
                events.push(DashboardEvent::AnalyticsRefreshFailed(err));
            }
        }
    }
}
