//! Product comments.

use chrono::{DateTime, Utc};
use serde::Serialize;

use minimart_core::{CommentId, ProductId, UserId};

/// A comment left on a product. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Data needed to insert a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub content: String,
}
