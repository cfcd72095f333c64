//! Authentication service.
//!
//! Password registration and login, opaque session tokens, and the
//! permission checks every protected route runs through.
//!
//! Each user holds at most one token. Login overwrites it, logout clears it,
//! and an empty token is never looked up.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, instrument};

use minimart_core::{Email, SessionToken, UserLevel, Username};

use crate::db::{RepositoryError, Store};
use crate::models::{AdminUser, CurrentUser, NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles registration, login/logout, and token resolution.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new customer and issue their first token.
    ///
    /// The level is always [`UserLevel::Customer`]; nothing in the request
    /// can raise it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::InvalidEmail` for
    /// malformed input, `AuthError::WeakPassword` if the password is too short,
    /// and `AuthError::UserAlreadyExists` if the username or email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<SessionToken, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let new_user = NewUser {
            username,
            email,
            password_hash,
            token: SessionToken::generate(),
        };

        let user = self
            .store
            .insert_user(&new_user)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(reason) => AuthError::UserAlreadyExists(reason),
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "user registered");
        Ok(new_user.token)
    }

    /// Check a password and issue a fresh token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .store
            .find_credentials(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = SessionToken::generate();
        self.store.replace_token(user.id, &token).await?;

        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Clear the session identified by `raw_token`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` for a blank token and
    /// `AuthError::SessionNotFound` if no user holds it.
    #[instrument(skip_all)]
    pub async fn logout(&self, raw_token: &str) -> Result<(), AuthError> {
        let token = SessionToken::parse(raw_token).ok_or(AuthError::MissingToken)?;

        if !self.store.clear_token(&token).await? {
            return Err(AuthError::SessionNotFound);
        }

        info!("user logged out");
        Ok(())
    }

    /// Resolve a token to the user holding it, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn resolve_user(
        &self,
        token: &SessionToken,
    ) -> Result<Option<CurrentUser>, AuthError> {
        Ok(self
            .store
            .find_user_by_token(token)
            .await?
            .map(CurrentUser::from))
    }

    /// Whether `token` belongs to an administrator.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn check_admin(&self, token: &SessionToken) -> Result<bool, AuthError> {
        Ok(self
            .resolve_user(token)
            .await?
            .is_some_and(|user| user.level.is_admin()))
    }

    /// Resolve a token, failing when nobody holds it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` for an unknown token.
    pub async fn authenticate(&self, token: &SessionToken) -> Result<CurrentUser, AuthError> {
        self.resolve_user(token)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }

    /// Resolve a token and require the admin level.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` for an unknown token and
    /// `AuthError::PermissionDenied` for a non-admin user.
    pub async fn authenticate_admin(&self, token: &SessionToken) -> Result<AdminUser, AuthError> {
        self.authenticate(token)
            .await?
            .into_admin()
            .ok_or(AuthError::PermissionDenied)
    }

    /// Change a user's level. Only reachable from the management CLI.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no user has that username.
    #[instrument(skip(self))]
    pub async fn set_level(&self, username: &str, level: UserLevel) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let user = self
            .store
            .set_level(&username, level)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, level = %user.level, "user level changed");
        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
