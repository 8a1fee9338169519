use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::repositories::user_repository::{RepositoryError, User, UserRepository};
use crate::domain::user::value_objects::Username;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    username: String,
    mail: String,
    admin: Option<bool>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            username: Username::new(row.username).map_err(RepositoryError::InvalidRecord)?,
            mail: row.mail,
            admin: row.admin.unwrap_or(false),
        })
    }
}

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, mail, admin
            FROM users
            WHERE username = $1
            LIMIT 1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
