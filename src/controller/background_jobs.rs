use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use super::jobs::JobMessage;
use super::{DashboardController, DashboardEvent, StatusTone};
use crate::sync::SyncError;

impl DashboardController {
    /// Apply every worker result that has already arrived, without blocking.
    pub fn poll_jobs(&mut self) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        loop {
            let message = match self.jobs.try_recv_message() {
                Ok(message) => message,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };
            self.apply_message(message, &mut events);
        }
        events
    }

    /// Block until at least one worker result arrives (or `timeout` passes),
    /// then apply it along with anything else already queued.
    pub fn wait_for_jobs(&mut self, timeout: Duration) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        if self.jobs.in_flight() == 0 {
            return events;
        }
        match self.jobs.recv_message_timeout(timeout) {
            Ok(message) => self.apply_message(message, &mut events),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return events,
        }
        events.extend(self.poll_jobs());
        events
    }

    /// Apply worker results until none are outstanding or `timeout` passes.
    ///
    /// Results that start follow-up work (a successful analysis triggers a
    /// reload) are waited on too.
    pub fn wait_for_idle(&mut self, timeout: Duration) -> Vec<DashboardEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while self.jobs.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(
                    "Gave up waiting on {} background jobs",
                    self.jobs.in_flight()
                );
                break;
            }
            events.extend(self.wait_for_jobs(remaining));
        }
        events
    }

    /// Cancel everything in flight.
    ///
    /// The aggregate and any analytics refresh are abandoned and the loading
    /// flag drops; pending read mutations are compensated right away; pending
    /// analyses are reported as cancelled. Late results are discarded.
    pub fn cancel_in_flight(&mut self) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        let mut cancelled_load = false;
        if let Some(job) = self.jobs.aggregate.take() {
            job.cancel.cancel();
            cancelled_load = true;
        }
        if let Some(job) = self.jobs.analytics_refresh.take() {
            job.cancel.cancel();
            cancelled_load = true;
        }
        if cancelled_load {
            self.store.cancel_load();
        }

        let mut reads: Vec<_> = self.jobs.pending_reads.drain().collect();
        reads.sort_by_key(|(mutation_id, _)| *mutation_id);
        for (_, pending) in reads {
            pending.cancel.cancel();
            let id = pending.mutation.key().clone();
            pending.mutation.compensate(&mut self.store);
            events.push(DashboardEvent::ReadCompensated {
                id,
                error: SyncError::Cancelled,
            });
        }

        let mut analyses: Vec<_> = self.jobs.analyses.drain().collect();
        analyses.sort_by_key(|(ticket, _)| *ticket);
        for (ticket, pending) in analyses {
            pending.cancel.cancel();
            events.push(DashboardEvent::AnalysisFinished {
                ticket,
                document_id: pending.document_id,
                result: Err(SyncError::Cancelled),
            });
        }

        if cancelled_load || !events.is_empty() {
            tracing::info!("Cancelled in-flight dashboard work");
            self.set_status("Cancelled", StatusTone::Warning);
        }
        events
    }

    fn apply_message(&mut self, message: JobMessage, events: &mut Vec<DashboardEvent>) {
        match message {
            JobMessage::AggregateFinished(message) => {
                self.apply_aggregate_finished(message, events)
            }
            JobMessage::ReadConfirmed(message) => self.apply_read_confirmed(message, events),
            JobMessage::AnalysisFinished(message) => self.apply_analysis_finished(message, events),
            JobMessage::AnalyticsRefreshed(message) => {
                self.apply_analytics_refreshed(message, events)
            }
        }
    }

    /// Keep `is_loading` raised while either kind of load is still running.
    pub(super) fn settle_loading_flag(&mut self) {
        if self.jobs.aggregate_in_progress() || self.jobs.analytics_refresh_in_progress() {
            self.store.mark_loading();
        }
    }
}
