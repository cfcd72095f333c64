//! Admin level management.
//!
//! Registration always creates customers; this is the only way to grant
//! catalog administration.
//!
//! ```bash
//! mm-cli admin promote -u alice
//! mm-cli admin demote -u alice
//! ```

use minimart_core::UserLevel;
use minimart_server::db::PgStore;
use minimart_server::services::{AuthError, AuthService};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("No user named {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Set the level of an existing user.
pub async fn set_level(username: &str, level: UserLevel) -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);

    let user = AuthService::new(&store)
        .set_level(username, level)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => AdminError::UnknownUser(username.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(
        "User {} (ID: {}) is now {}",
        user.username,
        user.id,
        user.level
    );
    if level == UserLevel::Admin {
        tracing::warn!("Existing tokens keep working; the new level applies immediately");
    }

    Ok(())
}
