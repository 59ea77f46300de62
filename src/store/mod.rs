//! Relational persistence for users, vacancies and résumés.
//!
//! All tables live in a single SQLite file; the store type implements one
//! trait per concern so the rest of the crate can depend on the narrowest
//! seam it needs.

mod models;
mod schema;
mod sqlite_store;

pub use models::{Resume, Vacancy};
pub use sqlite_store::SqliteHunterStore;

use crate::user::{AuthToken, AuthTokenValue, UserAuthCredentials};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a user and returns its id. Fails if the email is taken.
    fn create_user(&self, email: &str) -> Result<usize>;

    fn get_user_id(&self, email: &str) -> Result<Option<usize>>;

    fn get_user_email(&self, user_id: usize) -> Result<Option<String>>;

    fn get_user_auth_credentials(&self, email: &str) -> Result<Option<UserAuthCredentials>>;

    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()>;

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()>;

    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes the token, returning it if it existed.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Deletes tokens not used for the given number of days, returns how many.
    fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize>;
}

pub trait VacancyStore: Send + Sync {
    /// Inserts the vacancy unless one with the same board id already exists.
    /// Returns true if a row was inserted.
    fn insert_vacancy_if_new(&self, board_id: &str, name: &str, url: &str) -> Result<bool>;

    fn get_vacancy(&self, id: usize) -> Result<Option<Vacancy>>;

    fn get_vacancy_by_board_id(&self, board_id: &str) -> Result<Option<Vacancy>>;

    fn set_vacancy_description(&self, board_id: &str, description: &str) -> Result<()>;
}

pub trait ResumeStore: Send + Sync {
    fn create_resume(&self, user_id: usize, content: &str) -> Result<usize>;

    fn get_resume(&self, id: usize) -> Result<Option<Resume>>;

    fn get_all_resumes(&self) -> Result<Vec<Resume>>;
}

/// Everything the server needs from persistence.
pub trait FullStore: UserStore + VacancyStore + ResumeStore {}

impl<T: UserStore + VacancyStore + ResumeStore> FullStore for T {}
