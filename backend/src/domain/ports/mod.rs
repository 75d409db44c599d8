//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_store_error;

mod category_repository;
mod identity;
mod post_repository;
mod product_repository;

pub use category_repository::{CategoryRepository, CategoryStoreError};
pub use identity::{Actor, FixtureIdentityProvider, IdentityProvider, Role};
pub use post_repository::{PostRepository, PostStoreError};
pub use product_repository::{ProductRepository, ProductStoreError};
