//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] minimart_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] minimart_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("{0}")]
    UserAlreadyExists(String),

    /// A blank token was supplied where one is required.
    #[error("token cannot be empty")]
    MissingToken,

    /// No user holds the supplied token.
    #[error("session not found")]
    SessionNotFound,

    /// The request carries no usable session.
    #[error("authentication required")]
    Unauthenticated,

    /// The caller is authenticated but not an administrator.
    #[error("admin access required")]
    PermissionDenied,

    /// No user with that username.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
