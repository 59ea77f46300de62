use super::auth::{
    AuthToken, AuthTokenValue, HunterHasher, UserAuthCredentials, UsernamePasswordCredentials,
};
use crate::store::UserStore;
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::{sync::Arc, time::SystemTime};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 4;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex");
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("A user with this email already exists")]
    EmailTaken,
    #[error("Not a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    PasswordTooShort,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn UserStore>) -> Self {
        Self { user_store }
    }

    /// Creates a user with password credentials. Returns the new user id.
    pub fn register(&self, email: &str, password: &str) -> Result<usize, RegisterError> {
        if !EMAIL_REGEX.is_match(email) {
            return Err(RegisterError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RegisterError::PasswordTooShort);
        }
        if self.user_store.get_user_id(email)?.is_some() {
            return Err(RegisterError::EmailTaken);
        }

        let user_id = self.user_store.create_user(email)?;
        let hasher = HunterHasher::default();
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        self.user_store
            .update_user_auth_credentials(UserAuthCredentials {
                user_id,
                username_password: Some(UsernamePasswordCredentials {
                    user_id,
                    salt,
                    hash,
                    hasher,
                    created: SystemTime::now(),
                    last_tried: None,
                    last_used: None,
                }),
            })?;
        Ok(user_id)
    }

    pub fn get_user_credentials(&self, email: &str) -> Result<Option<UserAuthCredentials>> {
        self.user_store.get_user_auth_credentials(email)
    }

    /// Verifies email + password, issuing a fresh session token on success.
    pub fn login(&self, email: &str, password: &str) -> Result<Option<AuthToken>> {
        let credentials = match self.get_user_credentials(email)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let password_credentials = match &credentials.username_password {
            Some(pw) => pw,
            None => return Ok(None),
        };
        if !password_credentials.hasher.verify(
            password,
            password_credentials.hash.as_str(),
            password_credentials.salt.as_str(),
        )? {
            return Ok(None);
        }
        Ok(Some(self.generate_auth_token(&credentials)?))
    }

    pub fn generate_auth_token(&self, credentials: &UserAuthCredentials) -> Result<AuthToken> {
        let token = AuthToken {
            user_id: credentials.user_id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.user_store.add_user_auth_token(token.clone())?;
        Ok(token)
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        self.user_store.get_user_auth_token(value)
    }

    pub fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        self.user_store
            .update_user_auth_token_last_used_timestamp(value)
    }

    /// Ownership is checked before the delete so a mismatched request cannot
    /// destroy another user's session.
    pub fn delete_auth_token(&self, user_id: usize, value: &AuthTokenValue) -> Result<()> {
        match self.user_store.get_user_auth_token(value)? {
            Some(token) if token.user_id == user_id => {
                self.user_store.delete_user_auth_token(value)?;
                Ok(())
            }
            Some(_) => anyhow::bail!("Token does not belong to user {}", user_id),
            None => anyhow::bail!("Token not found"),
        }
    }

    pub fn get_user_email(&self, user_id: usize) -> Result<Option<String>> {
        self.user_store.get_user_email(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteHunterStore;
    use tempfile::TempDir;

    fn make_manager() -> (TempDir, UserManager) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteHunterStore::new(dir.path().join("hunter.db")).unwrap());
        (dir, UserManager::new(store))
    }

    #[test]
    fn register_twice_with_same_email_is_a_conflict() {
        let (_dir, manager) = make_manager();
        manager.register("ada@example.com", "love1ace").unwrap();
        assert!(matches!(
            manager.register("ada@example.com", "other-pw"),
            Err(RegisterError::EmailTaken)
        ));
    }

    #[test]
    fn register_rejects_malformed_email_and_short_password() {
        let (_dir, manager) = make_manager();
        assert!(matches!(
            manager.register("not-an-email", "love1ace"),
            Err(RegisterError::InvalidEmail)
        ));
        assert!(matches!(
            manager.register("ada@example.com", "abc"),
            Err(RegisterError::PasswordTooShort)
        ));
    }

    #[test]
    fn login_succeeds_only_with_the_right_password() {
        let (_dir, manager) = make_manager();
        manager.register("ada@example.com", "love1ace").unwrap();

        assert!(manager
            .login("ada@example.com", "wrong")
            .unwrap()
            .is_none());
        assert!(manager
            .login("nobody@example.com", "love1ace")
            .unwrap()
            .is_none());

        let token = manager
            .login("ada@example.com", "love1ace")
            .unwrap()
            .expect("expected a session token");
        let stored = manager.get_auth_token(&token.value).unwrap().unwrap();
        assert_eq!(stored.user_id, token.user_id);
    }

    #[test]
    fn logout_deletes_only_the_owning_users_token() {
        let (_dir, manager) = make_manager();
        let ada = manager.register("ada@example.com", "love1ace").unwrap();
        manager.register("bob@example.com", "hunter22").unwrap();

        let ada_token = manager.login("ada@example.com", "love1ace").unwrap().unwrap();
        let bob_token = manager.login("bob@example.com", "hunter22").unwrap().unwrap();

        assert!(manager.delete_auth_token(ada, &bob_token.value).is_err());
        // The mismatched request must leave bob's session intact
        assert!(manager.get_auth_token(&bob_token.value).unwrap().is_some());

        manager.delete_auth_token(ada, &ada_token.value).unwrap();
        assert!(manager.get_auth_token(&ada_token.value).unwrap().is_none());
        assert!(manager.get_auth_token(&bob_token.value).unwrap().is_some());
    }
}
