use std::sync::Arc;

use super::jobs::{JobMessage, PendingRead, ReadConfirmResult};
use super::{DashboardController, DashboardEvent, StatusTone};
use crate::api::Notification;
use crate::cancel::CancelToken;
use crate::sync::{NotificationFilter, Settlement, optimistic};

impl DashboardController {
    /// Mark a notification read now and confirm with the backend in the background.
    ///
    /// Returns false, without any request, when `id` is not in the snapshot.
    /// While an earlier read of the same notification is unsettled, the new
    /// one compensates to the same value as that earlier read.
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(mut mutation) = optimistic::begin_mark_read(&mut self.store, id) else {
            tracing::warn!("Ignoring mark-read for unknown notification {id}");
            return false;
        };
        let shared_prior = self
            .jobs
            .pending_reads_of(id)
            .next()
            .map(|earlier| *earlier.mutation.prior());
        if let Some(prior) = shared_prior {
            tracing::debug!("Notification {id} already has a read in flight");
            mutation.rebase(prior);
        }
        let mutation_id = self.jobs.next_id();
        let cancel = CancelToken::new();
        let backend = Arc::clone(&self.backend);
        let ctx = self.call_context(cancel.clone());
        let id = id.to_string();
        self.jobs
            .pending_reads
            .insert(mutation_id, PendingRead { mutation, cancel });
        self.jobs.spawn(move || {
            JobMessage::ReadConfirmed(ReadConfirmResult {
                mutation_id,
                result: optimistic::confirm_mark_read(backend.as_ref(), &id, &ctx),
            })
        });
        true
    }

    /// Mark every visible notification read locally. No request is made, so
    /// the next refresh restores whatever the server holds.
    pub fn mark_all_read(&mut self) -> usize {
        let changed = self.store.mark_all_read();
        if changed > 0 {
            self.set_status(
                format!("Marked {changed} notifications as read"),
                StatusTone::Info,
            );
        }
        changed
    }

    /// Hide a notification locally until the next successful refresh.
    pub fn delete_notification(&mut self, id: &str) -> bool {
        let hidden = self.store.hide_notification(id);
        if !hidden {
            tracing::debug!("Nothing to hide for notification {id}");
        }
        hidden
    }

    pub fn notifications(&self, filter: NotificationFilter) -> Vec<&Notification> {
        self.store.notifications_matching(filter)
    }

    pub fn unread_count(&self) -> usize {
        self.store.unread_count()
    }

    pub(super) fn apply_read_confirmed(
        &mut self,
        message: ReadConfirmResult,
        events: &mut Vec<DashboardEvent>,
    ) {
        let Some(pending) = self.jobs.pending_reads.remove(&message.mutation_id) else {
            return;
        };
        let id = pending.mutation.key().clone();
        let overlapping = self.jobs.pending_reads_of(&id).next().is_some();
        let result = match message.result {
            Ok(()) => {
                for later in self.jobs.pending_reads_of(&id) {
                    later.mutation.rebase(true);
                }
                Ok(())
            }
            Err(error) if overlapping => {
                // The last read of this notification to settle decides its value.
                tracing::warn!("{error}; a later read of {id} is still pending");
                self.set_status(error.to_string(), StatusTone::Error);
                events.push(DashboardEvent::ReadFailed { id, error });
                return;
            }
            Err(error) => Err(error),
        };
        match pending.mutation.settle(&mut self.store, result) {
            Settlement::Confirmed => {
                tracing::debug!("Notification {id} confirmed as read");
                events.push(DashboardEvent::ReadConfirmed { id });
            }
            Settlement::Compensated(error) => {
                tracing::warn!("{error}");
                self.set_status(error.to_string(), StatusTone::Error);
                events.push(DashboardEvent::ReadCompensated { id, error });
            }
        }
    }
}
