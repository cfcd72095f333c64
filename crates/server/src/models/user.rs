//! User account types.

use chrono::{DateTime, Utc};

use minimart_core::{Email, SessionToken, UserId, UserLevel, Username};

/// A registered user (domain type).
///
/// The password hash and session token never leave the storage layer through
/// this type; credential checks go through dedicated repository calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact email.
    pub email: Email,
    /// Authorization level.
    pub level: UserLevel,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user row last changed (login, logout, promotion).
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a user.
///
/// There is no level field: every registration starts as
/// [`UserLevel::Customer`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Token issued at registration.
    pub token: SessionToken,
}
