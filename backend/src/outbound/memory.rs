//! In-memory repository adapters.
//!
//! Back the domain ports with process-local maps. Query execution against a
//! real relational store lives behind the ports; these adapters keep the
//! service fully functional for development and tests.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::category::{Category, CategoryChanges, CategoryFilter, NewCategory};
use crate::domain::ports::{
    CategoryRepository, CategoryStoreError, PostRepository, PostStoreError, ProductRepository,
    ProductStoreError,
};
use crate::domain::post::{NewPost, Post, PostChanges, PostFilter};
use crate::domain::product::{NewProduct, Product, ProductChanges, ProductFilter};

fn poisoned(entity: &str) -> String {
    format!("{entity} store lock poisoned")
}

/// Map-backed product store.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    records: RwLock<BTreeMap<i64, Product>>,
    next_id: AtomicI64,
}

impl InMemoryProductRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        let mut products: Vec<Product> = records
            .values()
            .filter(|product| match filter {
                ProductFilter::All => true,
                ProductFilter::Active => product.is_active,
                ProductFilter::Available => product.is_available(),
                ProductFilter::Category(id) => product.category_id == *id,
                ProductFilter::Search(term) => {
                    let needle = term.to_lowercase();
                    product.is_active
                        && (product.name.to_lowercase().contains(&needle)
                            || product.description.to_lowercase().contains(&needle))
                }
            })
            .cloned()
            .collect();
        products.reverse();
        Ok(products)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ProductStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        Ok(records.get(&id).cloned())
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, ProductStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        Ok(records
            .values()
            .find(|product| product.sku.as_deref() == Some(sku))
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ProductStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        Ok(records.values().find(|product| product.slug == slug).cloned())
    }

    async fn count(&self) -> Result<u64, ProductStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        Ok(records.len() as u64)
    }

    async fn insert(&self, draft: NewProduct) -> Result<Product, ProductStoreError> {
        let now = Utc::now();
        let product = Product {
            id: self.allocate_id(),
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            price: draft.price,
            quantity: draft.quantity,
            sku: draft.sku,
            category_id: draft.category_id,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        let mut records = self
            .records
            .write()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        records.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<Product>, ProductStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        let Some(product) = records.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(slug) = changes.slug {
            product.slug = slug;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(quantity) = changes.quantity {
            product.quantity = quantity;
        }
        if let Some(sku) = changes.sku {
            product.sku = Some(sku);
        }
        if let Some(category_id) = changes.category_id {
            product.category_id = category_id;
        }
        if let Some(is_active) = changes.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, ProductStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ProductStoreError::connection(poisoned("product")))?;
        Ok(records.remove(&id).is_some())
    }
}

/// Map-backed category store.
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    records: RwLock<BTreeMap<i64, Category>>,
    next_id: AtomicI64,
}

impl InMemoryCategoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the stock category set.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::new();
        let seeds = [
            ("Electronics", "electronics", "Electronic products"),
            ("Clothing", "clothing", "Fashion and clothing"),
            ("Books", "books", "Books and literature"),
            ("Technology", "technology", "Technology posts"),
            ("Lifestyle", "lifestyle", "Lifestyle articles"),
        ];
        let now = Utc::now();
        let mut records = BTreeMap::new();
        for (index, (name, slug, description)) in seeds.into_iter().enumerate() {
            let id = index as i64 + 1;
            records.insert(
                id,
                Category {
                    id,
                    name: name.to_owned(),
                    slug: slug.to_owned(),
                    description: Some(description.to_owned()),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        store.next_id.store(records.len() as i64, Ordering::Relaxed);
        *store.records.write().unwrap_or_else(std::sync::PoisonError::into_inner) = records;
        store
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, CategoryStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| CategoryStoreError::connection(poisoned("category")))?;
        Ok(records
            .values()
            .filter(|category| match filter {
                CategoryFilter::All => true,
                CategoryFilter::Active => category.is_active,
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, CategoryStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| CategoryStoreError::connection(poisoned("category")))?;
        Ok(records.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, CategoryStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| CategoryStoreError::connection(poisoned("category")))?;
        Ok(records.values().find(|category| category.slug == slug).cloned())
    }

    async fn exists(&self, id: i64) -> Result<bool, CategoryStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| CategoryStoreError::connection(poisoned("category")))?;
        Ok(records.contains_key(&id))
    }

    async fn insert(&self, draft: NewCategory) -> Result<Category, CategoryStoreError> {
        let now = Utc::now();
        let category = Category {
            id: self.allocate_id(),
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        let mut records = self
            .records
            .write()
            .map_err(|_| CategoryStoreError::connection(poisoned("category")))?;
        records.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: i64,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, CategoryStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CategoryStoreError::connection(poisoned("category")))?;
        let Some(category) = records.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(slug) = changes.slug {
            category.slug = slug;
        }
        if let Some(description) = changes.description {
            category.description = Some(description);
        }
        if let Some(is_active) = changes.is_active {
            category.is_active = is_active;
        }
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, CategoryStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CategoryStoreError::connection(poisoned("category")))?;
        Ok(records.remove(&id).is_some())
    }
}

/// Map-backed post store.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    records: RwLock<BTreeMap<i64, Post>>,
    next_id: AtomicI64,
}

impl InMemoryPostRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, PostStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| PostStoreError::connection(poisoned("post")))?;
        let mut posts: Vec<Post> = records
            .values()
            .filter(|post| match filter {
                PostFilter::All => true,
                PostFilter::Published => post.is_published,
                PostFilter::User(id) => post.user_id == *id,
                PostFilter::Category(id) => post.category_id == *id,
            })
            .cloned()
            .collect();
        posts.reverse();
        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, PostStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| PostStoreError::connection(poisoned("post")))?;
        Ok(records.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, PostStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| PostStoreError::connection(poisoned("post")))?;
        Ok(records.values().find(|post| post.slug == slug).cloned())
    }

    async fn insert(&self, draft: NewPost) -> Result<Post, PostStoreError> {
        let now = Utc::now();
        let post = Post {
            id: self.allocate_id(),
            title: draft.title,
            slug: draft.slug,
            content: draft.content,
            excerpt: draft.excerpt,
            user_id: draft.user_id,
            category_id: draft.category_id,
            published_at: draft.published_at,
            is_published: draft.is_published,
            created_at: now,
            updated_at: now,
        };
        let mut records = self
            .records
            .write()
            .map_err(|_| PostStoreError::connection(poisoned("post")))?;
        records.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Option<Post>, PostStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PostStoreError::connection(poisoned("post")))?;
        let Some(post) = records.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(slug) = changes.slug {
            post.slug = slug;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(excerpt) = changes.excerpt {
            post.excerpt = Some(excerpt);
        }
        if let Some(category_id) = changes.category_id {
            post.category_id = category_id;
        }
        if let Some(published_at) = changes.published_at {
            post.published_at = Some(published_at);
        }
        if let Some(is_published) = changes.is_published {
            post.is_published = is_published;
        }
        if changes.clear_published_at {
            post.published_at = None;
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, PostStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PostStoreError::connection(poisoned("post")))?;
        Ok(records.remove(&id).is_some())
    }
}
