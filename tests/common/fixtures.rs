//! Test fixtures
//!
//! Creates the isolated database and the stub job board each test server uses.

use super::constants::*;
use anyhow::{bail, Result};
use async_trait::async_trait;
use smart_hunter_server::board::{BoardSalary, BoardVacancy, JobBoard};
use smart_hunter_server::store::SqliteHunterStore;
use smart_hunter_server::user::UserManager;
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a temporary database pre-populated with the two test users.
pub fn create_test_db_with_users() -> Result<(TempDir, Arc<SqliteHunterStore>)> {
    let temp_dir = TempDir::new()?;
    let store = Arc::new(SqliteHunterStore::new(temp_dir.path().join("hunter.db"))?);

    let user_manager = UserManager::new(store.clone());
    user_manager.register(TEST_EMAIL, TEST_PASS)?;
    user_manager.register(OTHER_EMAIL, OTHER_PASS)?;

    Ok((temp_dir, store))
}

/// Stub job board with canned search results.
///
/// Every search returns the same two vacancies. Only the first one has a
/// full text available, the second one polls as unknown on the board.
pub struct StubJobBoard {
    pub fail: bool,
}

#[async_trait]
impl JobBoard for StubJobBoard {
    async fn search(&self, _text: &str) -> Result<Vec<BoardVacancy>> {
        if self.fail {
            bail!("stub board is down");
        }
        Ok(vec![
            BoardVacancy {
                id: BOARD_VACANCY_1_ID.to_string(),
                name: BOARD_VACANCY_1_NAME.to_string(),
                alternate_url: Some(format!("https://hh.example/vacancy/{}", BOARD_VACANCY_1_ID)),
                salary: Some(BoardSalary {
                    from: Some(1000),
                    to: Some(2000),
                    currency: Some("EUR".to_string()),
                }),
            },
            BoardVacancy {
                id: BOARD_VACANCY_2_ID.to_string(),
                name: BOARD_VACANCY_2_NAME.to_string(),
                alternate_url: None,
                salary: None,
            },
        ])
    }

    async fn vacancy_full_text(&self, board_id: &str) -> Result<Option<String>> {
        if self.fail {
            bail!("stub board is down");
        }
        if board_id == BOARD_VACANCY_1_ID {
            Ok(Some(BOARD_VACANCY_1_TEXT.to_string()))
        } else {
            Ok(None)
        }
    }
}
