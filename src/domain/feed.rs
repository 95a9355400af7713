use serde::{Deserialize, Serialize};

pub type FeedId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub id: FeedId,
    pub url: String,
    pub title: String,
    pub description: String,
}

impl Feed {
    pub fn new(id: FeedId, url: String, draft: FeedDraft) -> Self {
        Self {
            id,
            url,
            title: draft.title,
            description: draft.description,
        }
    }

    /// Replace the mutable metadata, leaving `id` and `url` untouched.
    pub fn refresh(&mut self, draft: FeedDraft) {
        self.title = draft.title;
        self.description = draft.description;
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// Feed-level metadata as parsed, before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDraft {
    pub title: String,
    pub description: String,
}
