//! Registration, login and logout.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tracing::instrument;

use minimart_core::SessionToken;

use super::{ApiJson, Envelope, data};
use crate::error::Result;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Logout request body.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub token: String,
}

/// Create a customer account and return its first token.
///
/// Any level field in the body is ignored; new accounts are always customers.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<Envelope<SessionToken>>> {
    let token = state
        .auth()
        .register(&body.username, &body.password, &body.email)
        .await?;
    Ok(data(token))
}

/// Check credentials and return a fresh token.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Envelope<SessionToken>>> {
    let token = state.auth().login(&body.username, &body.password).await?;
    Ok(data(token))
}

/// Clear the session named in the body.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LogoutRequest>,
) -> Result<Json<Envelope<&'static str>>> {
    state.auth().logout(&body.token).await?;
    Ok(data("Logout successful."))
}
