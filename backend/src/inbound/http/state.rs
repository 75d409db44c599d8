//! Shared HTTP adapter state.
//!
//! Handlers accept this bundle via `actix_web::web::Data`, so they only
//! depend on domain services and ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FixtureIdentityProvider, IdentityProvider};
use crate::domain::{CategoryService, PostService, ProductService};
use crate::outbound::memory::{
    InMemoryCategoryRepository, InMemoryPostRepository, InMemoryProductRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub posts: Arc<PostService>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl HttpState {
    /// Wire every service against the in-memory store, categories seeded
    /// with the stock set so product creation has valid foreign targets.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        let products = Arc::new(InMemoryProductRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::seeded());
        let posts = Arc::new(InMemoryPostRepository::new());
        Self {
            products: Arc::new(ProductService::new(products.clone(), categories.clone())),
            categories: Arc::new(CategoryService::new(
                categories.clone(),
                products,
                posts.clone(),
            )),
            posts: Arc::new(PostService::new(posts, categories)),
            identity: Arc::new(FixtureIdentityProvider),
        }
    }

    /// Swap the identity upstream.
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }
}
