//! Port abstraction for category persistence adapters.

use async_trait::async_trait;

use crate::domain::category::{Category, CategoryChanges, CategoryFilter, NewCategory};

use super::define_store_error;

define_store_error! {
    /// Persistence errors raised by category store adapters.
    pub enum CategoryStoreError {
        /// Store connection could not be established.
        Connection => "category store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "category store query failed: {message}",
    }
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List categories matching the filter.
    async fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, CategoryStoreError>;

    /// Fetch a category by identifier.
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, CategoryStoreError>;

    /// Fetch a category by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, CategoryStoreError>;

    /// Whether a category with this id exists.
    async fn exists(&self, id: i64) -> Result<bool, CategoryStoreError>;

    /// Persist a new category, assigning id and timestamps.
    async fn insert(&self, draft: NewCategory) -> Result<Category, CategoryStoreError>;

    /// Apply changes to an existing category; `None` when the id is unknown.
    async fn update(
        &self,
        id: i64,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, CategoryStoreError>;

    /// Remove a category; returns whether a record was deleted.
    async fn delete(&self, id: i64) -> Result<bool, CategoryStoreError>;
}
