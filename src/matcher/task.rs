use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle a client uses to poll for a match result.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn generate() -> TaskId {
        TaskId(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Started,
    Success,
    Failure,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }
}

/// Current state of a task as seen by pollers.
#[derive(Debug, Clone, Serialize)]
pub struct TaskState {
    pub status: TaskStatus,
    pub result: Option<String>,
}

impl TaskState {
    pub fn pending() -> Self {
        TaskState {
            status: TaskStatus::Pending,
            result: None,
        }
    }
}

/// The payload a worker scores: both documents as plain text.
#[derive(Debug, Clone)]
pub struct MatchJob {
    pub resume_text: String,
    pub vacancy_text: String,
}
