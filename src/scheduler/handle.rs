use tokio::sync::{mpsc, oneshot};

use crate::app::SyncError;
use crate::domain::{EntryId, Feed};
use crate::scheduler::StopSignal;
use crate::store::Snapshot;

pub(crate) enum Command {
    AddFeed {
        url: String,
        reply: oneshot::Sender<Result<Feed, SyncError>>,
    },
    MarkViewed {
        entry_id: EntryId,
        reply: oneshot::Sender<Result<(), SyncError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
}

/// Talks to a scheduler running on its own task.
///
/// Requests are served while the scheduler waits between cycles. An added
/// feed's fetch runs to completion even if stop is raised meanwhile, and the
/// delay before the next cycle restarts once the add has been admitted.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
    stop: StopSignal,
}

impl SchedulerHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>, stop: StopSignal) -> Self {
        Self { commands, stop }
    }

    pub async fn add_feed(&self, url: &str) -> Result<Feed, SyncError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::AddFeed {
            url: url.to_string(),
            reply,
        })
        .await?;
        response.await.map_err(|_| not_running())?
    }

    pub async fn mark_viewed(&self, entry_id: EntryId) -> Result<(), SyncError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::MarkViewed { entry_id, reply }).await?;
        response.await.map_err(|_| not_running())?
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SyncError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        response.await.map_err(|_| not_running())
    }

    /// Ask the scheduler to stop. A cycle in flight completes first.
    pub fn stop(&self) {
        self.stop.raise();
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    async fn send(&self, command: Command) -> Result<(), SyncError> {
        self.commands.send(command).await.map_err(|_| not_running())
    }
}

fn not_running() -> SyncError {
    SyncError::Unknown("Scheduler is not running".to_string())
}
