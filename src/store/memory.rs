use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Utc;

use crate::app::StoreError;
use crate::domain::{
    Entry, EntryDraft, EntryId, ErrorKind, Feed, FeedDraft, FeedId, IdAllocator, ProcessState,
    Status,
};
use crate::merge::{EntryKey, IdentityKey};
use crate::store::{Snapshot, StateChange, StateObserver};

/// In-memory collection of feeds and entries plus the process-wide status.
///
/// Lookups go through id-keyed maps; display order is kept in separate id
/// lists. Feeds are listed newest first, entries newest batch first with
/// document order preserved inside a batch.
pub struct StateStore {
    identity: IdentityKey,
    feed_ids: IdAllocator,
    entry_ids: IdAllocator,
    feeds: HashMap<FeedId, Feed>,
    feed_order: Vec<FeedId>,
    urls: HashMap<String, FeedId>,
    entries: HashMap<EntryId, Entry>,
    entry_order: VecDeque<EntryId>,
    feed_entries: HashMap<FeedId, Vec<EntryId>>,
    feed_keys: HashMap<FeedId, HashSet<EntryKey>>,
    viewed: Vec<EntryId>,
    status: Status,
    observers: Vec<Box<dyn StateObserver>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(IdentityKey::default())
    }
}

impl StateStore {
    pub fn new(identity: IdentityKey) -> Self {
        Self {
            identity,
            feed_ids: IdAllocator::new(),
            entry_ids: IdAllocator::new(),
            feeds: HashMap::new(),
            feed_order: Vec::new(),
            urls: HashMap::new(),
            entries: HashMap::new(),
            entry_order: VecDeque::new(),
            feed_entries: HashMap::new(),
            feed_keys: HashMap::new(),
            viewed: Vec::new(),
            status: Status::default(),
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    pub fn identity(&self) -> IdentityKey {
        self.identity
    }

    // Mutation

    /// Register a feed together with its first entries.
    pub fn admit_feed(
        &mut self,
        url: &str,
        draft: FeedDraft,
        entries: Vec<EntryDraft>,
    ) -> Result<(Feed, Vec<Entry>), StoreError> {
        if self.urls.contains_key(url) {
            return Err(StoreError::DuplicateUrl(url.to_string()));
        }

        let feed = Feed::new(self.feed_ids.allocate(), url.to_string(), draft);
        self.urls.insert(feed.url.clone(), feed.id);
        self.feeds.insert(feed.id, feed.clone());
        self.feed_order.push(feed.id);
        self.feed_entries.insert(feed.id, Vec::new());
        self.feed_keys.insert(feed.id, HashSet::new());

        let admitted = self.insert_entries(feed.id, entries);
        tracing::info!(
            "Admitted feed {} ({}) with {} entries",
            feed.id,
            feed.url,
            admitted.len()
        );

        self.notify(StateChange::FeedAdded {
            feed: feed.clone(),
            entries: admitted.clone(),
        });
        Ok((feed, admitted))
    }

    /// Append entries to a known feed. Drafts whose identity key the feed
    /// already holds are skipped.
    pub fn admit_entries(
        &mut self,
        feed_id: FeedId,
        drafts: Vec<EntryDraft>,
    ) -> Result<Vec<Entry>, StoreError> {
        if !self.feeds.contains_key(&feed_id) {
            return Err(StoreError::UnknownFeed(feed_id));
        }

        let admitted = self.insert_entries(feed_id, drafts);
        if !admitted.is_empty() {
            tracing::info!("Admitted {} new entries for feed {}", admitted.len(), feed_id);
            self.notify(StateChange::EntriesAdded(admitted.clone()));
        }
        Ok(admitted)
    }

    pub fn refresh_feed(&mut self, feed_id: FeedId, draft: FeedDraft) -> Result<(), StoreError> {
        let feed = self
            .feeds
            .get_mut(&feed_id)
            .ok_or(StoreError::UnknownFeed(feed_id))?;

        if feed.title == draft.title && feed.description == draft.description {
            return Ok(());
        }

        feed.refresh(draft);
        let refreshed = feed.clone();
        self.notify(StateChange::FeedRefreshed(refreshed));
        Ok(())
    }

    pub fn set_status(&mut self, process_state: ProcessState, error: Option<ErrorKind>) {
        self.status = Status {
            process_state,
            error,
            updated_at: Utc::now(),
        };
        self.notify(StateChange::StatusChanged(self.status.clone()));
    }

    pub fn mark_viewed(&mut self, entry_id: EntryId) -> Result<(), StoreError> {
        if self.entry(entry_id).is_none() {
            return Err(StoreError::UnknownEntry(entry_id));
        }
        if self.viewed.contains(&entry_id) {
            return Ok(());
        }

        self.viewed.push(entry_id);
        self.notify(StateChange::EntryViewed(entry_id));
        Ok(())
    }

    /// Allocate-then-insert for one batch. Callers have checked the feed exists.
    fn insert_entries(&mut self, feed_id: FeedId, drafts: Vec<EntryDraft>) -> Vec<Entry> {
        let discovered_at = Utc::now();
        let identity = self.identity;
        let keys = self.feed_keys.entry(feed_id).or_default();

        let admitted: Vec<Entry> = drafts
            .into_iter()
            .filter(|draft| keys.insert(identity.of_draft(draft)))
            .map(|draft| draft.admit(self.entry_ids.allocate(), feed_id, discovered_at))
            .collect();

        let per_feed = self.feed_entries.entry(feed_id).or_default();
        for entry in &admitted {
            per_feed.push(entry.id);
            self.entries.insert(entry.id, entry.clone());
        }
        for entry in admitted.iter().rev() {
            self.entry_order.push_front(entry.id);
        }

        admitted
    }

    fn notify(&self, change: StateChange) {
        for observer in &self.observers {
            observer.on_change(&change);
        }
    }

    // Reads

    /// Feeds, newest first.
    pub fn feeds(&self) -> impl Iterator<Item = &Feed> {
        self.feed_order.iter().rev().filter_map(|id| self.feeds.get(id))
    }

    pub fn feed(&self, id: FeedId) -> Option<&Feed> {
        self.feeds.get(&id)
    }

    pub fn feed_by_url(&self, url: &str) -> Option<&Feed> {
        self.urls.get(url).and_then(|id| self.feeds.get(id))
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }

    /// All entries, newest batch first.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entry_order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// Entries of one feed, in admission order.
    pub fn entries_for_feed(&self, feed_id: FeedId) -> impl Iterator<Item = &Entry> {
        self.feed_entries
            .get(&feed_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(id))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn viewed(&self) -> &[EntryId] {
        &self.viewed
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            feeds: self.feeds().cloned().collect(),
            entries: self.entries().cloned().collect(),
            status: self.status.clone(),
            viewed_entries: self.viewed.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn feed_draft(title: &str) -> FeedDraft {
        FeedDraft {
            title: title.into(),
            description: String::new(),
        }
    }

    fn drafts(titles: &[&str]) -> Vec<EntryDraft> {
        titles
            .iter()
            .map(|t| EntryDraft::new(*t, format!("https://example.com/{}", t)))
            .collect()
    }

    fn titles(store: &StateStore) -> Vec<String> {
        store.entries().map(|e| e.title.clone()).collect()
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<StateChange>>);

    impl StateObserver for Arc<Recorder> {
        fn on_change(&self, change: &StateChange) {
            self.0.lock().unwrap().push(change.clone());
        }
    }

    #[test]
    fn test_admit_feed_assigns_ids() {
        let mut store = StateStore::default();
        let (feed, entries) = store
            .admit_feed("https://a.example/rss", feed_draft("Feed A"), drafts(&["Post 1", "Post 2"]))
            .unwrap();

        assert_eq!(feed.id, 1);
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(entries.iter().all(|e| e.feed_id == 1));
        assert_eq!(store.feed_by_url("https://a.example/rss").unwrap().title, "Feed A");
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let mut store = StateStore::default();
        store
            .admit_feed("https://a.example/rss", feed_draft("A"), vec![])
            .unwrap();
        let err = store
            .admit_feed("https://a.example/rss", feed_draft("A again"), drafts(&["x"]))
            .unwrap_err();

        assert_eq!(err, StoreError::DuplicateUrl("https://a.example/rss".into()));
        assert_eq!(store.feed_count(), 1);
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_entries_for_unknown_feed_rejected() {
        let mut store = StateStore::default();
        let err = store.admit_entries(42, drafts(&["orphan"])).unwrap_err();
        assert_eq!(err, StoreError::UnknownFeed(42));
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_display_order_is_newest_batch_first() {
        let mut store = StateStore::default();
        let (feed, _) = store
            .admit_feed("https://a.example/rss", feed_draft("A"), drafts(&["Post 1", "Post 2"]))
            .unwrap();
        store.admit_entries(feed.id, drafts(&["Post 3", "Post 4"])).unwrap();

        assert_eq!(titles(&store), vec!["Post 3", "Post 4", "Post 1", "Post 2"]);
        let per_feed: Vec<_> = store.entries_for_feed(feed.id).map(|e| e.id).collect();
        assert_eq!(per_feed, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_feeds_newest_first() {
        let mut store = StateStore::default();
        store.admit_feed("https://a.example/rss", feed_draft("A"), vec![]).unwrap();
        store.admit_feed("https://b.example/rss", feed_draft("B"), vec![]).unwrap();

        let order: Vec<_> = store.feeds().map(|f| f.title.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_known_identity_skipped_within_feed_only() {
        let mut store = StateStore::default();
        let (a, _) = store
            .admit_feed("https://a.example/rss", feed_draft("A"), drafts(&["Shared", "Shared"]))
            .unwrap();
        let (b, b_entries) = store
            .admit_feed("https://b.example/rss", feed_draft("B"), drafts(&["Shared"]))
            .unwrap();

        assert_eq!(store.entries_for_feed(a.id).count(), 1);
        assert_eq!(b_entries.len(), 1);
        assert!(store.admit_entries(b.id, drafts(&["Shared"])).unwrap().is_empty());
    }

    #[test]
    fn test_ids_strictly_increase_across_feeds() {
        let mut store = StateStore::default();
        let (a, _) = store
            .admit_feed("https://a.example/rss", feed_draft("A"), drafts(&["1", "2"]))
            .unwrap();
        let (b, _) = store
            .admit_feed("https://b.example/rss", feed_draft("B"), drafts(&["3"]))
            .unwrap();
        store.admit_entries(a.id, drafts(&["4"])).unwrap();

        assert!(b.id > a.id);
        let mut ids: Vec<_> = store.entries().map(|e| e.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(store
            .entries()
            .all(|e| store.feed(e.feed_id).is_some()));
    }

    #[test]
    fn test_refresh_keeps_identity() {
        let mut store = StateStore::default();
        let (feed, _) = store
            .admit_feed("https://a.example/rss", feed_draft("Old"), vec![])
            .unwrap();
        store.refresh_feed(feed.id, feed_draft("New")).unwrap();

        let refreshed = store.feed(feed.id).unwrap();
        assert_eq!(refreshed.id, feed.id);
        assert_eq!(refreshed.url, "https://a.example/rss");
        assert_eq!(refreshed.title, "New");
        assert_eq!(store.refresh_feed(9, feed_draft("x")), Err(StoreError::UnknownFeed(9)));
    }

    #[test]
    fn test_mark_viewed() {
        let mut store = StateStore::default();
        store
            .admit_feed("https://a.example/rss", feed_draft("A"), drafts(&["Post 1"]))
            .unwrap();

        assert_eq!(store.entry(1).map(|e| e.title.as_str()), Some("Post 1"));
        assert!(store.entry(5).is_none());

        store.mark_viewed(1).unwrap();
        store.mark_viewed(1).unwrap();
        assert_eq!(store.viewed(), &[1]);
        assert_eq!(store.mark_viewed(5), Err(StoreError::UnknownEntry(5)));
    }

    #[test]
    fn test_observers_see_every_mutation() {
        let recorder = Arc::new(Recorder::default());
        let mut store = StateStore::default();
        store.subscribe(Box::new(recorder.clone()));

        store.set_status(ProcessState::Loading, None);
        let (feed, _) = store
            .admit_feed("https://a.example/rss", feed_draft("A"), drafts(&["Post 1"]))
            .unwrap();
        store.admit_entries(feed.id, drafts(&["Post 1"])).unwrap();
        store.admit_entries(feed.id, drafts(&["Post 2"])).unwrap();
        store.set_status(ProcessState::Fault, Some(ErrorKind::NetworkFault));

        let changes = recorder.0.lock().unwrap();
        assert_eq!(changes.len(), 4);
        assert!(matches!(changes[0], StateChange::StatusChanged(_)));
        assert!(matches!(changes[1], StateChange::FeedAdded { .. }));
        assert!(matches!(&changes[2], StateChange::EntriesAdded(e) if e[0].title == "Post 2"));
        assert!(matches!(
            &changes[3],
            StateChange::StatusChanged(s) if s.error == Some(ErrorKind::NetworkFault)
        ));
    }

    #[test]
    fn test_title_and_link_identity_store() {
        let mut store = StateStore::new(IdentityKey::TitleAndLink);
        let (_, entries) = store
            .admit_feed(
                "https://a.example/rss",
                feed_draft("A"),
                vec![
                    EntryDraft::new("Same", "https://a.example/1"),
                    EntryDraft::new("Same", "https://a.example/2"),
                ],
            )
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut store = StateStore::default();
        store
            .admit_feed("https://a.example/rss", feed_draft("A"), drafts(&["Post 1"]))
            .unwrap();
        store.set_status(ProcessState::Success, None);

        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["feeds"][0]["title"], "A");
        assert_eq!(json["entries"][0]["feedId"], 1);
        assert_eq!(json["status"]["processState"], "success");
        assert!(json["viewedEntries"].as_array().unwrap().is_empty());
    }
}
