//! `PostgreSQL` comment queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use minimart_core::{CommentId, ProductId, UserId};

use super::{CommentRepository, PgStore, RepositoryError};
use crate::models::{Comment, NewComment};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "INSERT INTO comments (user_id, product_id, content) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, product_id, content, created_at",
        )
        .bind(comment.user_id)
        .bind(comment.product_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_comments_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, user_id, product_id, content, created_at \
             FROM comments WHERE product_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
