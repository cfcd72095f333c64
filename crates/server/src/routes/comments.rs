//! Product comments.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use minimart_core::ProductId;

use super::{ApiJson, Envelope, data, parse_id};
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::Comment;
use crate::state::AppState;

/// Build the comment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comment", post(create))
        .route("/comment/{product_id}", get(index))
}

/// Comment body.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(rename = "productID", alias = "product_id")]
    pub product_id: ProductId,
    pub content: String,
}

/// Comments on a product, newest first.
#[instrument(skip(state))]
pub async fn index(
    _: RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Envelope<Vec<Comment>>>> {
    let product_id: ProductId = parse_id(&product_id)?;
    let comments = state.comments().list_comments(product_id).await?;
    Ok(data(comments))
}

/// Comment on a product as the caller.
#[instrument(skip(user, state, body), fields(product_id = %body.product_id))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCommentRequest>,
) -> Result<Json<Envelope<Comment>>> {
    let comment = state
        .comments()
        .add_comment(&user, body.product_id, &body.content)
        .await?;
    Ok(data(comment))
}
