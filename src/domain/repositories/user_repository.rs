use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::user::value_objects::Username;

/// User record as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: Username,
    pub mail: String,
    pub admin: bool,
}

/// Errors surfaced by user storage adapters
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid stored user: {0}")]
    InvalidRecord(String),
}

/// Repository trait for User records
///
/// Users are created and removed elsewhere; the web front end only reads.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the user whose username matches exactly
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError>;
}
