pub mod memory;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{Entry, EntryId, Feed, Status};

pub use memory::StateStore;

/// One mutation of the store, as seen by observers.
#[derive(Debug, Clone)]
pub enum StateChange {
    FeedAdded { feed: Feed, entries: Vec<Entry> },
    FeedRefreshed(Feed),
    EntriesAdded(Vec<Entry>),
    StatusChanged(Status),
    EntryViewed(EntryId),
}

/// Notified after every store mutation.
pub trait StateObserver: Send + Sync {
    fn on_change(&self, change: &StateChange);
}

impl StateObserver for UnboundedSender<StateChange> {
    fn on_change(&self, change: &StateChange) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.send(change.clone());
    }
}

/// Read-only copy of the whole store, in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub feeds: Vec<Feed>,
    pub entries: Vec<Entry>,
    pub status: Status,
    pub viewed_entries: Vec<EntryId>,
}
