//! Asynchronous résumé/vacancy compatibility scoring.
//!
//! The HTTP layer enqueues a match job and gets back a task id; a pool of
//! background workers consumes the queue and records results in a shared
//! result map. Clients poll the task id until it reaches a terminal state.

mod handle;
mod task;
mod worker;

pub use handle::{EnqueueError, MatcherHandle};
pub use task::{MatchJob, TaskId, TaskState, TaskStatus};
pub use worker::{MatchWorkerPool, MatcherSettings};
