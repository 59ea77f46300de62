use axum::extract::FromRef;

use crate::board::JobBoard;
use crate::matcher::MatcherHandle;
use crate::store::FullStore;
use crate::user::UserManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedStore = Arc<dyn FullStore>;
pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedJobBoard = Arc<dyn JobBoard>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedStore,
    pub user_manager: GuardedUserManager,
    pub job_board: GuardedJobBoard,
    pub matcher: MatcherHandle,
}

impl FromRef<ServerState> for GuardedStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedJobBoard {
    fn from_ref(input: &ServerState) -> Self {
        input.job_board.clone()
    }
}

impl FromRef<ServerState> for MatcherHandle {
    fn from_ref(input: &ServerState) -> Self {
        input.matcher.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
