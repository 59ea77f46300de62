//! Smart Hunter Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod board;
pub mod config;
pub mod matcher;
pub mod server;
pub mod sqlite_persistence;
pub mod store;
pub mod user;

// Re-export commonly used types for convenience
pub use board::{HhJobBoard, JobBoard};
pub use matcher::{MatchWorkerPool, MatcherHandle, MatcherSettings};
pub use server::{run_server, RequestsLoggingLevel};
pub use store::{FullStore, SqliteHunterStore};
pub use user::UserManager;
