use super::task::{MatchJob, TaskId, TaskState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

/// A job travelling through the broker channel together with its id.
pub(super) struct QueuedTask {
    pub id: TaskId,
    pub job: MatchJob,
}

/// A task state plus the instant it reached a terminal status, so the
/// sweeper knows when the entry can be dropped.
pub(super) struct TaskEntry {
    pub state: TaskState,
    pub finished_at: Option<Instant>,
}

impl TaskEntry {
    pub fn new(state: TaskState) -> Self {
        let finished_at = state.status.is_terminal().then(Instant::now);
        Self { state, finished_at }
    }
}

/// Result backend shared between the handle and the workers.
pub(super) type SharedTaskStates = Arc<RwLock<HashMap<TaskId, TaskEntry>>>;

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("Match queue is full")]
    QueueFull,
    #[error("Match workers are not running")]
    WorkersStopped,
}

/// Handle to the match worker pool for HTTP handlers.
///
/// Cloning is cheap; all clones feed the same queue and read the same
/// result map.
#[derive(Clone)]
pub struct MatcherHandle {
    job_tx: mpsc::Sender<QueuedTask>,
    task_states: SharedTaskStates,
}

impl MatcherHandle {
    pub(super) fn new(job_tx: mpsc::Sender<QueuedTask>, task_states: SharedTaskStates) -> Self {
        Self {
            job_tx,
            task_states,
        }
    }

    /// Registers the task as pending and hands it to the workers.
    pub async fn enqueue(&self, job: MatchJob) -> Result<TaskId, EnqueueError> {
        let id = TaskId::generate();
        self.task_states
            .write()
            .await
            .insert(id.clone(), TaskEntry::new(TaskState::pending()));

        match self.job_tx.try_send(QueuedTask {
            id: id.clone(),
            job,
        }) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.task_states.write().await.remove(&id);
                match err {
                    mpsc::error::TrySendError::Full(_) => Err(EnqueueError::QueueFull),
                    mpsc::error::TrySendError::Closed(_) => Err(EnqueueError::WorkersStopped),
                }
            }
        }
    }

    /// Reads the state of a task.
    ///
    /// Unknown ids read as pending: a client that polls with a stale or
    /// mistyped id sees the same thing as one polling a queued-but-unstarted
    /// task, which is what off-the-shelf result backends do as well. Results
    /// older than the retention window are pruned and read as pending too.
    pub async fn status(&self, id: &TaskId) -> TaskState {
        self.task_states
            .read()
            .await
            .get(id)
            .map(|entry| entry.state.clone())
            .unwrap_or_else(TaskState::pending)
    }
}
