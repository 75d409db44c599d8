//! Port abstraction for product persistence adapters.

use async_trait::async_trait;

use crate::domain::product::{NewProduct, Product, ProductChanges, ProductFilter};

use super::define_store_error;

define_store_error! {
    /// Persistence errors raised by product store adapters.
    pub enum ProductStoreError {
        /// Store connection could not be established.
        Connection => "product store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "product store query failed: {message}",
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products matching the filter, newest first.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductStoreError>;

    /// Fetch a product by identifier.
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ProductStoreError>;

    /// Fetch a product by SKU.
    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, ProductStoreError>;

    /// Fetch a product by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ProductStoreError>;

    /// Number of stored products.
    async fn count(&self) -> Result<u64, ProductStoreError>;

    /// Persist a new product, assigning id and timestamps.
    async fn insert(&self, draft: NewProduct) -> Result<Product, ProductStoreError>;

    /// Apply changes to an existing product; `None` when the id is unknown.
    async fn update(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<Product>, ProductStoreError>;

    /// Remove a product; returns whether a record was deleted.
    async fn delete(&self, id: i64) -> Result<bool, ProductStoreError>;
}
