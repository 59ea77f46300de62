pub mod auth;
mod user_manager;

pub use auth::{
    AuthToken, AuthTokenValue, HunterHasher, UserAuthCredentials, UsernamePasswordCredentials,
};
pub use user_manager::{RegisterError, UserManager, MIN_PASSWORD_LENGTH};
