//! Dashboard aggregation and synchronization core.
//!
//! These pieces are synchronous and free of threads of their own, apart from
//! the scoped fan-out inside [`aggregate::fetch_each`]. The
//! [`crate::controller::DashboardController`] decides when to run them and
//! applies their results to the [`SnapshotStore`].

pub mod actions;
pub mod aggregate;
mod error;
pub mod freshness;
pub mod optimistic;
pub mod store;

pub use aggregate::{
    AggregateFetcher, AggregateFields, AggregateOutcome, FieldResults, MergePolicy,
    PartialAggregate, fetch_all,
};
pub use error::{ActionKind, SyncError};
pub use freshness::FreshnessGate;
pub use optimistic::{Compensable, PendingMutation, Settlement};
pub use store::{LoadPhase, NotificationFilter, Snapshot, SnapshotStore};
