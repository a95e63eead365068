//! Apply-confirm-compensate primitive for local changes made ahead of the server.

use crate::api::DashboardBackend;
use crate::cancel::CallContext;

use super::SyncError;
use super::store::SnapshotStore;

/// State that can take an optimistic write and later have it reverted.
pub trait Compensable<K, V> {
    /// Current value at `key`, or `None` when the key is not present.
    fn current(&self, key: &K) -> Option<V>;
    /// Write `value` at `key`. Returns false when the key is not present.
    fn write(&mut self, key: &K, value: V) -> bool;
}

impl Compensable<String, bool> for SnapshotStore {
    fn current(&self, key: &String) -> Option<bool> {
        self.notification(key).map(|notification| notification.read)
    }

    fn write(&mut self, key: &String, value: bool) -> bool {
        self.set_read(key, value)
    }
}

/// How a pending mutation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<E> {
    /// The server accepted the change; the optimistic value stands.
    Confirmed,
    /// The server refused; the prior value was written back.
    Compensated(E),
}

/// An optimistic write awaiting confirmation.
///
/// Compensation writes the captured prior value back by key into whatever
/// state is current at that moment. If a full refresh replaced the entry in
/// the meantime, the refreshed value is overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending mutation must be settled or compensated"]
pub struct PendingMutation<K, V> {
    key: K,
    prior: V,
}

impl<K, V: Clone> PendingMutation<K, V> {
    /// Capture the prior value at `key` and write `value` in its place.
    /// Returns `None`, leaving the store untouched, when `key` is unknown.
    pub fn apply<S>(store: &mut S, key: K, value: V) -> Option<Self>
    where
        S: Compensable<K, V> + ?Sized,
    {
        let prior = store.current(&key)?;
        store.write(&key, value);
        Some(Self { key, prior })
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn prior(&self) -> &V {
        &self.prior
    }

    /// Replace the value compensation writes back.
    ///
    /// Overlapping mutations of one key share the value from before the first
    /// of them, moved forward whenever one of them is confirmed.
    pub fn rebase(&mut self, prior: V) {
        self.prior = prior;
    }

    /// Consume the mutation with the confirming request's outcome.
    pub fn settle<S, E>(self, store: &mut S, confirmation: Result<(), E>) -> Settlement<E>
    where
        S: Compensable<K, V> + ?Sized,
    {
        match confirmation {
            Ok(()) => Settlement::Confirmed,
            Err(err) => {
                self.compensate(store);
                Settlement::Compensated(err)
            }
        }
    }

    /// Write the prior value back. Returns false if the key has since vanished.
    pub fn compensate<S>(self, store: &mut S) -> bool
    where
        S: Compensable<K, V> + ?Sized,
    {
        store.write(&self.key, self.prior)
    }
}

/// Optimistically mark a notification read. `None` for an unknown id.
pub fn begin_mark_read(store: &mut SnapshotStore, id: &str) -> Option<PendingMutation<String, bool>> {
    PendingMutation::apply(store, id.to_string(), true)
}

/// Issue the confirming request for a read mutation.
pub fn confirm_mark_read<B>(backend: &B, id: &str, ctx: &CallContext) -> Result<(), SyncError>
where
    B: DashboardBackend + ?Sized,
{
    backend
        .mark_notification_read(id, ctx)
        .map_err(|err| SyncError::MutationConfirm {
            id: id.to_string(),
            reason: err.to_string(),
        })
}
