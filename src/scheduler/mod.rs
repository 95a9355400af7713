//! Polling scheduler.
//!
//! Adds feeds on request and re-polls every known feed in rounds. A round
//! fans out over all feeds, waits for every one of them to settle, admits
//! what succeeded, and only then arms the delay before the next round.

pub mod handle;
pub mod signal;

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::app::{StoreError, SyncError};
use crate::config::{format_interval, SyncConfig};
use crate::domain::{Entry, ErrorKind, Feed, FeedId, ProcessState};
use crate::store::StateStore;
use crate::sync::{validate_url, SyncOutcome, SyncTarget, Synchronizer};

use handle::Command;
pub use handle::SchedulerHandle;
pub use signal::{stop_on_shutdown_signal, StopSignal};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    RunningCycle,
    Waiting,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFailure {
    pub feed_id: FeedId,
    pub url: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Summary of one polling round.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub feeds: usize,
    pub new_entries: Vec<Entry>,
    pub failures: Vec<CycleFailure>,
}

/// Feed and entries admitted by one outcome.
#[derive(Debug, Clone)]
pub struct Admission {
    pub feed: Feed,
    pub entries: Vec<Entry>,
}

enum Wake {
    Elapsed,
    Stopped,
    Command(Option<Command>),
}

pub struct Scheduler {
    synchronizer: Synchronizer,
    store: StateStore,
    interval: Duration,
    workers: usize,
    state: SchedulerState,
    cycles: u64,
}

impl Scheduler {
    pub fn new(synchronizer: Synchronizer, config: &SyncConfig) -> Self {
        let store = StateStore::new(synchronizer.identity());
        Self {
            synchronizer,
            store,
            interval: config.interval,
            workers: config.workers.max(1),
            state: SchedulerState::Idle,
            cycles: 0,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Completed polling rounds.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Fetch a new feed once and admit it with all of its entries.
    ///
    /// Status moves to `loading`, then to `success` or to `fault` with the
    /// error kind. Nothing is admitted on failure.
    pub async fn add_feed(&mut self, url: &str) -> Result<Feed, SyncError> {
        let result = self.try_add_feed(url).await;

        match &result {
            Ok(feed) => {
                tracing::info!("Added feed {} ({})", feed.display_title(), feed.url);
                self.store.set_status(ProcessState::Success, None);
            }
            Err(e) => {
                tracing::warn!("Failed to add feed {}: {}", url, e);
                self.store.set_status(ProcessState::Fault, Some(e.kind()));
            }
        }

        result
    }

    async fn try_add_feed(&mut self, url: &str) -> Result<Feed, SyncError> {
        let url = validate_url(url, self.store.urls())?;
        self.store.set_status(ProcessState::Loading, None);

        let outcome = self
            .synchronizer
            .sync_one(SyncTarget::New {
                url: url.as_str(),
            })
            .await?;

        Ok(self.apply(outcome)?.feed)
    }

    /// Re-poll every known feed once.
    ///
    /// A failing feed marks the status as `fault` and is retried next round;
    /// it never holds back the other feeds.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.state = SchedulerState::RunningCycle;
        let start = Utc::now();

        let results = {
            let store = &self.store;
            let synchronizer = &self.synchronizer;
            let limit = Semaphore::new(self.workers);

            let pending: Vec<_> = store
                .feeds()
                .map(|feed| {
                    let existing = store.entries_for_feed(feed.id).collect();
                    refresh_one(synchronizer, &limit, feed, existing)
                })
                .collect();

            join_all(pending).await
        };

        let mut report = CycleReport {
            feeds: results.len(),
            ..CycleReport::default()
        };

        for (feed_id, url, result) in results {
            match result.and_then(|outcome| self.apply(outcome).map_err(SyncError::from)) {
                Ok(admission) => {
                    if !admission.entries.is_empty() {
                        tracing::info!(
                            "{} new entries from {}",
                            admission.entries.len(),
                            admission.feed.display_title()
                        );
                    }
                    report.new_entries.extend(admission.entries);
                }
                Err(e) => {
                    tracing::warn!("Error updating {}: {}", url, e);
                    self.store.set_status(ProcessState::Fault, Some(e.kind()));
                    report.failures.push(CycleFailure {
                        feed_id,
                        url,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.cycles += 1;
        let elapsed = Utc::now().signed_duration_since(start);
        tracing::debug!(
            "Cycle {} complete: {} feeds, {} new entries, {} errors ({:.1}s)",
            self.cycles,
            report.feeds,
            report.new_entries.len(),
            report.failures.len(),
            elapsed.num_milliseconds() as f64 / 1000.0
        );

        report
    }

    /// Admit one outcome: feed registration and entries, or a refresh.
    pub fn apply(&mut self, outcome: SyncOutcome) -> Result<Admission, StoreError> {
        match outcome {
            SyncOutcome::Discovered { url, feed, entries } => {
                let (feed, entries) = self.store.admit_feed(&url, feed, entries)?;
                Ok(Admission { feed, entries })
            }
            SyncOutcome::Refreshed {
                feed_id,
                feed,
                new_entries,
            } => {
                self.store.refresh_feed(feed_id, feed)?;
                let entries = self.store.admit_entries(feed_id, new_entries)?;
                let feed = self
                    .store
                    .feed(feed_id)
                    .cloned()
                    .ok_or(StoreError::UnknownFeed(feed_id))?;
                Ok(Admission { feed, entries })
            }
        }
    }

    /// Poll until `stop` is raised.
    ///
    /// The first round starts immediately. Each delay is measured from the
    /// end of the previous round, so slow rounds push the next one out.
    pub async fn run(&mut self, stop: &StopSignal) {
        self.drive(stop, None).await;
    }

    /// Move the scheduler onto its own task.
    pub fn spawn(mut self, stop: StopSignal) -> (SchedulerHandle, JoinHandle<Scheduler>) {
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let handle = SchedulerHandle::new(commands, stop.clone());

        let task = tokio::spawn(async move {
            self.drive(&stop, Some(receiver)).await;
            self
        });

        (handle, task)
    }

    async fn drive(&mut self, stop: &StopSignal, mut commands: Option<mpsc::Receiver<Command>>) {
        tracing::info!("Polling every {}", format_interval(self.interval));

        'rounds: loop {
            self.run_cycle().await;

            if stop.is_raised() {
                break;
            }

            self.state = SchedulerState::Waiting;
            let delay = tokio::time::sleep(self.interval);
            tokio::pin!(delay);

            loop {
                let wake = tokio::select! {
                    _ = &mut delay => Wake::Elapsed,
                    _ = stop.wait() => Wake::Stopped,
                    command = next_command(&mut commands) => Wake::Command(command),
                };

                match wake {
                    Wake::Elapsed => break,
                    Wake::Stopped => break 'rounds,
                    Wake::Command(Some(command)) => {
                        let fetched = matches!(command, Command::AddFeed { .. });
                        self.handle_command(command).await;
                        if stop.is_raised() {
                            break 'rounds;
                        }
                        if fetched {
                            delay.as_mut().reset(Instant::now() + self.interval);
                        }
                    }
                    Wake::Command(None) => commands = None,
                }
            }
        }

        self.state = SchedulerState::Stopped;
        tracing::info!("Scheduler stopped after {} cycles", self.cycles);
    }

    async fn handle_command(&mut self, command: Command) {
        // A requester that went away no longer wants the answer.
        match command {
            Command::AddFeed { url, reply } => {
                let result = self.add_feed(&url).await;
                let _ = reply.send(result);
            }
            Command::MarkViewed { entry_id, reply } => {
                let result = self.store.mark_viewed(entry_id).map_err(SyncError::from);
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.store.snapshot());
            }
        }
    }
}

async fn refresh_one<'a>(
    synchronizer: &'a Synchronizer,
    limit: &'a Semaphore,
    feed: &'a Feed,
    existing: Vec<&'a Entry>,
) -> (FeedId, String, Result<SyncOutcome, SyncError>) {
    // The semaphore lives for the whole round and is never closed.
    let _permit = limit.acquire().await.ok();
    let result = synchronizer
        .sync_one(SyncTarget::Existing { feed, existing })
        .await;
    (feed.id, feed.url.clone(), result)
}

async fn next_command(commands: &mut Option<mpsc::Receiver<Command>>) -> Option<Command> {
    match commands {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
