//! One fetch, parse and merge step for a single feed.
//!
//! The [`Synchronizer`] never mutates state. It reports what it found as a
//! [`SyncOutcome`] and leaves admission to the caller, so a whole round of
//! feeds can run concurrently against one read-only view of the store.

pub mod validate;

use std::sync::Arc;

use crate::app::SyncError;
use crate::domain::{Entry, EntryDraft, Feed, FeedDraft, FeedId};
use crate::fetcher::Fetcher;
use crate::merge::{diff_new, IdentityKey};
use crate::normalizer::Normalizer;

pub use validate::validate_url;

/// What to synchronize.
pub enum SyncTarget<'a> {
    /// A URL not yet in the store.
    New { url: &'a str },
    /// A known feed together with the entries it already has.
    Existing {
        feed: &'a Feed,
        existing: Vec<&'a Entry>,
    },
}

impl SyncTarget<'_> {
    pub fn url(&self) -> &str {
        match self {
            SyncTarget::New { url } => url,
            SyncTarget::Existing { feed, .. } => &feed.url,
        }
    }
}

/// Result of a successful step, ready for admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Discovered {
        url: String,
        feed: FeedDraft,
        entries: Vec<EntryDraft>,
    },
    Refreshed {
        feed_id: FeedId,
        feed: FeedDraft,
        new_entries: Vec<EntryDraft>,
    },
}

#[derive(Clone)]
pub struct Synchronizer {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    identity: IdentityKey,
}

impl Synchronizer {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, identity: IdentityKey) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::new(),
            identity,
        }
    }

    pub fn identity(&self) -> IdentityKey {
        self.identity
    }

    pub async fn sync_one(&self, target: SyncTarget<'_>) -> Result<SyncOutcome, SyncError> {
        let raw = self.fetcher.fetch_raw(target.url()).await?;
        let parsed = self.normalizer.parse(&raw)?;
        tracing::debug!(
            "Parsed {} entries from {}",
            parsed.entries.len(),
            target.url()
        );

        let outcome = match target {
            SyncTarget::New { url } => SyncOutcome::Discovered {
                url: url.to_string(),
                feed: parsed.feed,
                entries: diff_new(parsed.entries, std::iter::empty(), self.identity),
            },
            SyncTarget::Existing { feed, existing } => SyncOutcome::Refreshed {
                feed_id: feed.id,
                feed: parsed.feed,
                new_entries: diff_new(parsed.entries, existing, self.identity),
            },
        };

        Ok(outcome)
    }
}
