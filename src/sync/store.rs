//! Process-local dashboard state and the operations allowed to change it.

use std::collections::{BTreeMap, HashSet};

use time::OffsetDateTime;

use crate::api::{
    Analytics, DocumentSummary, Notification, NotificationKind, Overview, Priority, Resource,
    TimelineEvent,
};

use super::aggregate::{AggregateFields, PartialAggregate};

/// Message stored when a recompute request fails.
pub const ANALYTICS_REFRESH_FAILED: &str = "Failed to refresh analytics";

/// The full aggregated dashboard view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub overview: Option<Overview>,
    pub documents: Vec<DocumentSummary>,
    pub notifications: Vec<Notification>,
    pub timeline: Vec<TimelineEvent>,
    pub analytics: Option<Analytics>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Time of the last successful aggregate or analytics refresh.
    pub last_updated: Option<OffsetDateTime>,
}

impl Snapshot {
    /// The five data fields, for comparing before and after a load.
    pub fn fields(&self) -> AggregateFields {
        AggregateFields {
            overview: self.overview.clone(),
            documents: self.documents.clone(),
            notifications: self.notifications.clone(),
            timeline: self.timeline.clone(),
            analytics: self.analytics.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Errored,
}

/// Notification list tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotificationFilter {
    #[default]
    All,
    Unread,
    /// High-priority warnings.
    Compliance,
    /// Informational notices.
    System,
}

impl NotificationFilter {
    pub fn matches(self, notification: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !notification.read,
            Self::Compliance => {
                notification.priority == Priority::High
                    && notification.kind == NotificationKind::Warning
            }
            Self::System => notification.kind == NotificationKind::Info,
        }
    }
}

/// Owns the [`Snapshot`] plus the local-only view state layered over it.
///
/// Every method runs to completion on the controller thread, so readers never
/// observe a half-applied update.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Snapshot,
    hidden: HashSet<String>,
    phase: LoadPhase,
    field_errors: BTreeMap<Resource, String>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn has_overview(&self) -> bool {
        self.snapshot.overview.is_some()
    }

    /// Per-resource failures from the last partial load.
    pub fn field_errors(&self) -> &BTreeMap<Resource, String> {
        &self.field_errors
    }

    pub fn begin_load(&mut self) {
        self.snapshot.is_loading = true;
        self.snapshot.error = None;
        self.phase = LoadPhase::Loading;
    }

    /// Replace all five fields at once after a successful aggregate.
    pub fn replace(&mut self, fields: AggregateFields, now: OffsetDateTime) {
        let AggregateFields {
            overview,
            documents,
            notifications,
            timeline,
            analytics,
        } = fields;
        self.snapshot.overview = overview;
        self.snapshot.documents = documents;
        self.snapshot.notifications = notifications;
        self.snapshot.timeline = timeline;
        self.snapshot.analytics = analytics;
        self.snapshot.last_updated = Some(now);
        self.snapshot.is_loading = false;
        self.snapshot.error = None;
        self.hidden.clear();
        self.field_errors.clear();
        self.phase = LoadPhase::Ready;
    }

    /// Apply the fields that loaded; failed ones keep their prior value.
    /// `last_updated` is left alone since the view is not fully fresh.
    pub fn apply_partial(&mut self, partial: PartialAggregate) {
        let error = partial.failure_summary();
        if let Some(overview) = partial.overview {
            self.snapshot.overview = overview;
        }
        if let Some(documents) = partial.documents {
            self.snapshot.documents = documents;
        }
        if let Some(notifications) = partial.notifications {
            self.snapshot.notifications = notifications;
            self.hidden.clear();
        }
        if let Some(timeline) = partial.timeline {
            self.snapshot.timeline = timeline;
        }
        if let Some(analytics) = partial.analytics {
            self.snapshot.analytics = analytics;
        }
        self.field_errors = partial.failures.into_iter().collect();
        self.snapshot.is_loading = false;
        self.snapshot.error = error;
        self.phase = LoadPhase::Ready;
    }

    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.snapshot.is_loading = false;
        self.snapshot.error = Some(message.into());
        self.phase = LoadPhase::Errored;
    }

    /// Abandon a load without recording an error.
    pub fn cancel_load(&mut self) {
        self.snapshot.is_loading = false;
        self.phase = LoadPhase::Idle;
    }

    /// Raise the loading flag again while another load is still in flight.
    pub fn mark_loading(&mut self) {
        self.snapshot.is_loading = true;
        self.phase = LoadPhase::Loading;
    }

    /// Unlike [`Self::begin_load`], keeps any error from the last aggregate.
    pub fn begin_analytics_refresh(&mut self) {
        self.mark_loading();
    }

    /// Replace only `analytics`; the other data fields are untouched.
    pub fn patch_analytics(&mut self, analytics: Option<Analytics>, now: OffsetDateTime) {
        self.snapshot.analytics = analytics;
        self.snapshot.last_updated = Some(now);
        self.snapshot.is_loading = false;
        self.field_errors.remove(&Resource::Analytics);
        self.phase = LoadPhase::Ready;
    }

    pub fn fail_analytics_refresh(&mut self) {
        self.fail_load(ANALYTICS_REFRESH_FAILED);
    }

    pub fn notification(&self, id: &str) -> Option<&Notification> {
        self.snapshot
            .notifications
            .iter()
            .find(|notification| notification.id == id)
    }

    /// Set the `read` flag of the notification with `id`. Returns false when
    /// no such notification is present.
    pub fn set_read(&mut self, id: &str, read: bool) -> bool {
        match self
            .snapshot
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
        {
            Some(notification) => {
                notification.read = read;
                true
            }
            None => false,
        }
    }

    /// Mark every visible notification read locally. Returns how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let hidden = &self.hidden;
        let mut changed = 0;
        for notification in self
            .snapshot
            .notifications
            .iter_mut()
            .filter(|notification| !hidden.contains(&notification.id))
        {
            if !notification.read {
                notification.read = true;
                changed += 1;
            }
        }
        changed
    }

    /// Hide a notification from the view until the next successful refresh.
    pub fn hide_notification(&mut self, id: &str) -> bool {
        if self.notification(id).is_none() {
            return false;
        }
        self.hidden.insert(id.to_string())
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    pub fn visible_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.snapshot
            .notifications
            .iter()
            .filter(|notification| !self.hidden.contains(&notification.id))
    }

    pub fn notifications_matching(&self, filter: NotificationFilter) -> Vec<&Notification> {
        self.visible_notifications()
            .filter(|notification| filter.matches(notification))
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.visible_notifications()
            .filter(|notification| !notification.read)
            .count()
    }
}
