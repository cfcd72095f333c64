//! Product comments.

use thiserror::Error;
use tracing::{info, instrument};

use minimart_core::ProductId;

use crate::db::{RepositoryError, Store};
use crate::models::{Comment, CurrentUser, NewComment};

/// Maximum comment length in characters.
const MAX_CONTENT_LENGTH: usize = 2000;

/// Errors from the comment service.
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("comment cannot be empty")]
    EmptyContent,

    #[error("comment must be at most 2000 characters")]
    ContentTooLong,

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct CommentService<'a> {
    store: &'a dyn Store,
}

impl<'a> CommentService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Attach a comment to a live product.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::EmptyContent` or `CommentError::ContentTooLong`
    /// for bad content and `CommentError::ProductNotFound` if the product does
    /// not exist.
    #[instrument(skip(self, user, content), fields(user_id = %user.id))]
    pub async fn add_comment(
        &self,
        user: &CurrentUser,
        product_id: ProductId,
        content: &str,
    ) -> Result<Comment, CommentError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CommentError::EmptyContent);
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(CommentError::ContentTooLong);
        }

        if self.store.find_product(product_id).await?.is_none() {
            return Err(CommentError::ProductNotFound(product_id));
        }

        let comment = self
            .store
            .insert_comment(&NewComment {
                user_id: user.id,
                product_id,
                content: content.to_owned(),
            })
            .await?;

        info!(comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    /// Comments on a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::Repository` if the query fails.
    pub async fn list_comments(&self, product_id: ProductId) -> Result<Vec<Comment>, CommentError> {
        Ok(self.store.list_comments_for_product(product_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::InventoryLedger;
    use crate::services::testing::{admin, customer, new_product};

    #[tokio::test]
    async fn test_comments_listed_newest_first() {
        let store = MemoryStore::new();
        let admin = admin(&store).await;
        let product = InventoryLedger::new(&store)
            .create_product(&admin, &new_product("1.00", 1))
            .await
            .unwrap();
        let user = customer(&store, "reviewer").await;
        let comments = CommentService::new(&store);

        comments.add_comment(&user, product.id, "first").await.unwrap();
        comments
            .add_comment(&user, product.id, "  second  ")
            .await
            .unwrap();

        let listed: Vec<_> = comments
            .list_comments(product.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(listed, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_comment_validation() {
        let store = MemoryStore::new();
        let admin = admin(&store).await;
        let product = InventoryLedger::new(&store)
            .create_product(&admin, &new_product("1.00", 1))
            .await
            .unwrap();
        let user = customer(&store, "reviewer").await;
        let comments = CommentService::new(&store);

        assert!(matches!(
            comments.add_comment(&user, product.id, "   ").await,
            Err(CommentError::EmptyContent)
        ));
        assert!(matches!(
            comments
                .add_comment(&user, product.id, &"x".repeat(2001))
                .await,
            Err(CommentError::ContentTooLong)
        ));
        assert!(matches!(
            comments.add_comment(&user, ProductId::new(77), "hi").await,
            Err(CommentError::ProductNotFound(_))
        ));
    }
}
