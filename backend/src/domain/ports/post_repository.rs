//! Port abstraction for post persistence adapters.

use async_trait::async_trait;

use crate::domain::post::{NewPost, Post, PostChanges, PostFilter};

use super::define_store_error;

define_store_error! {
    /// Persistence errors raised by post store adapters.
    pub enum PostStoreError {
        /// Store connection could not be established.
        Connection => "post store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "post store query failed: {message}",
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// List posts matching the filter, newest first.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, PostStoreError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, PostStoreError>;

    /// Fetch a post by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, PostStoreError>;

    /// Persist a new post, assigning id and timestamps.
    async fn insert(&self, draft: NewPost) -> Result<Post, PostStoreError>;

    /// Apply changes to an existing post; `None` when the id is unknown.
    async fn update(&self, id: i64, changes: PostChanges) -> Result<Option<Post>, PostStoreError>;

    /// Remove a post; returns whether a record was deleted.
    async fn delete(&self, id: i64) -> Result<bool, PostStoreError>;
}
