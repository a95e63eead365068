use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::time::Duration;

use crate::api::{Analytics, AnalysisReport};
use crate::cancel::CancelToken;
use crate::sync::{AggregateOutcome, PendingMutation, SyncError};

/// Result sent back by a worker thread. Each spawned worker sends exactly one.
#[derive(Debug)]
pub(crate) enum JobMessage {
    AggregateFinished(AggregateJobResult),
    ReadConfirmed(ReadConfirmResult),
    AnalysisFinished(AnalysisJobResult),
    AnalyticsRefreshed(AnalyticsRefreshResult),
}

#[derive(Debug)]
pub(crate) struct AggregateJobResult {
    pub(crate) generation: u64,
    pub(crate) result: Result<AggregateOutcome, SyncError>,
}

#[derive(Debug)]
pub(crate) struct ReadConfirmResult {
    pub(crate) mutation_id: u64,
    pub(crate) result: Result<(), SyncError>,
}

#[derive(Debug)]
pub(crate) struct AnalysisJobResult {
    pub(crate) ticket: u64,
    pub(crate) document_id: String,
    pub(crate) result: Result<AnalysisReport, SyncError>,
}

#[derive(Debug)]
pub(crate) struct AnalyticsRefreshResult {
    pub(crate) generation: u64,
    pub(crate) result: Result<Option<Analytics>, SyncError>,
}

/// A cancellable job whose late result must match `generation` to be applied.
#[derive(Debug, Clone)]
pub(crate) struct RunningJob {
    pub(crate) generation: u64,
    pub(crate) cancel: CancelToken,
}

#[derive(Debug)]
pub(crate) struct PendingRead {
    pub(crate) mutation: PendingMutation<String, bool>,
    pub(crate) cancel: CancelToken,
}

#[derive(Debug)]
pub(crate) struct PendingAnalysis {
    pub(crate) document_id: String,
    pub(crate) cancel: CancelToken,
}

/// Bookkeeping for worker threads spawned by the controller.
pub(crate) struct ControllerJobs {
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    /// Workers spawned whose message has not been received yet.
    in_flight: usize,
    next_id: u64,
    pub(super) aggregate: Option<RunningJob>,
    pub(super) analytics_refresh: Option<RunningJob>,
    pub(super) pending_reads: HashMap<u64, PendingRead>,
    pub(super) analyses: HashMap<u64, PendingAnalysis>,
}

impl ControllerJobs {
    pub(super) fn new() -> Self {
        let (message_tx, message_rx) = channel::<JobMessage>();
        Self {
            message_tx,
            message_rx,
            in_flight: 0,
            next_id: 1,
            aggregate: None,
            analytics_refresh: None,
            pending_reads: HashMap::new(),
            analyses: HashMap::new(),
        }
    }

    pub(super) fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Run `work` on a new thread and route its message back to the controller.
    pub(super) fn spawn<F>(&mut self, work: F)
    where
        F: FnOnce() -> JobMessage + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.message_tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(work());
        });
    }

    pub(super) fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub(super) fn try_recv_message(&mut self) -> Result<JobMessage, TryRecvError> {
        let message = self.message_rx.try_recv()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Ok(message)
    }

    pub(super) fn recv_message_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<JobMessage, RecvTimeoutError> {
        let message = self.message_rx.recv_timeout(timeout)?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Ok(message)
    }

    /// Start a new aggregate generation, cancelling any older one.
    pub(super) fn begin_aggregate(&mut self) -> RunningJob {
        if let Some(previous) = self.aggregate.take() {
            tracing::debug!("Superseding aggregate generation {}", previous.generation);
            previous.cancel.cancel();
        }
        let job = RunningJob {
            generation: self.next_id(),
            cancel: CancelToken::new(),
        };
        self.aggregate = Some(job.clone());
        job
    }

    /// Clear the aggregate slot if `generation` is current. Returns whether it was.
    pub(super) fn finish_aggregate(&mut self, generation: u64) -> bool {
        match &self.aggregate {
            Some(job) if job.generation == generation => {
                self.aggregate = None;
                true
            }
            _ => false,
        }
    }

    /// Unsettled read mutations of notification `id`.
    pub(super) fn pending_reads_of<'a>(
        &'a mut self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a mut PendingRead> + 'a {
        self.pending_reads
            .values_mut()
            .filter(move |pending| pending.mutation.key() == id)
    }

    pub(super) fn aggregate_in_progress(&self) -> bool {
        self.aggregate.is_some()
    }

    pub(super) fn begin_analytics_refresh(&mut self) -> RunningJob {
        if let Some(previous) = self.analytics_refresh.take() {
            previous.cancel.cancel();
        }
        let job = RunningJob {
            generation: self.next_id(),
            cancel: CancelToken::new(),
        };
        self.analytics_refresh = Some(job.clone());
        job
    }

    pub(super) fn finish_analytics_refresh(&mut self, generation: u64) -> bool {
        match &self.analytics_refresh {
            Some(job) if job.generation == generation => {
                self.analytics_refresh = None;
                true
            }
            _ => false,
        }
    }

    pub(super) fn analytics_refresh_in_progress(&self) -> bool {
        self.analytics_refresh.is_some()
    }
}
