//! `PostgreSQL` user queries.
//!
//! The session token lives on the user row (`session_token`, unique and
//! nullable), so issuing a token overwrites the previous one and logging out
//! sets it back to `NULL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use minimart_core::{Email, SessionToken, UserId, UserLevel, Username};

use super::{PgStore, RepositoryError, UserRepository, map_unique_violation};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, level, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    level: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let level = UserLevel::try_from(row.level)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
            level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn describe_user_conflict(constraint: &str) -> String {
    if constraint.contains("email") {
        "email already registered".to_owned()
    } else {
        "username already taken".to_owned()
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, level, session_token) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(UserLevel::Customer)
        .bind(&user.token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, describe_user_conflict))?;

        row.try_into()
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    async fn find_user_by_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE session_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn replace_token(
        &self,
        id: UserId,
        token: &SessionToken,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET session_token = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn clear_token(&self, token: &SessionToken) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET session_token = NULL, updated_at = now() \
             WHERE session_token = $1",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_level(
        &self,
        username: &Username,
        level: UserLevel,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET level = $2, updated_at = now() \
             WHERE username = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(level)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
