use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::FeedId;

pub type EntryId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub feed_id: FeedId,
    pub title: String,
    pub link: String,
    pub description: String,
    pub discovered_at: DateTime<Utc>,
}

impl Entry {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}

/// An entry as parsed from a document, not yet admitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl EntryDraft {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: String::new(),
        }
    }

    pub fn admit(self, id: EntryId, feed_id: FeedId, discovered_at: DateTime<Utc>) -> Entry {
        Entry {
            id,
            feed_id,
            title: self.title,
            link: self.link,
            description: self.description,
            discovered_at,
        }
    }
}
