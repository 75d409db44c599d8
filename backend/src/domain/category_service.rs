//! Category use-cases, including the category's product and post listings.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::domain::category::{Category, CategoryChanges, CategoryFilter, NewCategory};
use crate::domain::error::{DomainError, ErrorKind, NotFoundRegistry, Subject};
use crate::domain::ports::{CategoryRepository, PostRepository, ProductRepository};
use crate::domain::post::{Post, PostFilter};
use crate::domain::product::{Product, ProductFilter};
use crate::domain::product_service::{SLUG_PATTERN, id_context};
use crate::domain::slug;
use crate::domain::validation::{self, Constraint, FieldType, RuleSet, Violations};

/// CRUD and query operations over categories.
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
    posts: Arc<dyn PostRepository>,
    registry: NotFoundRegistry,
}

impl CategoryService {
    #[must_use]
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            categories,
            products,
            posts,
            registry: NotFoundRegistry::default(),
        }
    }

    pub async fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, DomainError> {
        self.categories
            .list(filter)
            .await
            .map_err(|err| DomainError::database("list", err, Map::new()))
    }

    pub async fn get(&self, id: i64) -> Result<Category, DomainError> {
        let found = self
            .categories
            .find_by_id(id)
            .await
            .map_err(|err| DomainError::database("find", err, id_context(id)))?;
        found.ok_or_else(|| self.registry.not_found(Subject::Category, id))
    }

    pub async fn find_by_slug(&self, candidate: &str) -> Result<Category, DomainError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            let mut violations = Violations::default();
            violations.add("slug", "slug must not be blank");
            return Err(violations.into_error());
        }
        let mut context = Map::new();
        context.insert("slug".into(), json!(candidate));
        let found = self
            .categories
            .find_by_slug(candidate)
            .await
            .map_err(|err| DomainError::database("find", err, context))?;
        found.ok_or_else(|| {
            DomainError::new(
                ErrorKind::CategoryNotFound,
                format!("Category with slug '{candidate}' was not found."),
            )
            .with_detail("slug", json!(candidate))
            .with_detail("suggestion", json!("Check the category slug."))
        })
    }

    /// Products belonging to a category.
    pub async fn products_of(&self, id: i64) -> Result<Vec<Product>, DomainError> {
        self.get(id).await?;
        self.products
            .list(&ProductFilter::Category(id))
            .await
            .map_err(|err| DomainError::database("list", err, id_context(id)))
    }

    /// Posts belonging to a category.
    pub async fn posts_of(&self, id: i64) -> Result<Vec<Post>, DomainError> {
        self.get(id).await?;
        self.posts
            .list(&PostFilter::Category(id))
            .await
            .map_err(|err| DomainError::database("list", err, id_context(id)))
    }

    pub async fn create(&self, input: Map<String, Value>) -> Result<Category, DomainError> {
        let mut input = input;
        validation::normalize(&mut input);

        let slug_taken = match input.get("slug").and_then(Value::as_str) {
            Some(candidate) => self
                .categories
                .find_by_slug(candidate)
                .await
                .map_err(|err| DomainError::database("create", err, input.clone()))?
                .is_some(),
            None => false,
        };

        validation::validate(&input, &create_rules(slug_taken))?;
        self.fill_missing_slug(&mut input, None, "create").await?;

        input.retain(|_, value| !value.is_null());
        let draft: NewCategory = serde_json::from_value(Value::Object(input.clone()))
            .map_err(|err| DomainError::generic(format!("invalid category payload: {err}")))?;
        self.categories
            .insert(draft)
            .await
            .map_err(|err| DomainError::database("create", err, input))
    }

    pub async fn update(&self, id: i64, input: Map<String, Value>) -> Result<Category, DomainError> {
        self.get(id).await?;

        let mut input = input;
        validation::normalize(&mut input);

        let slug_taken = match input.get("slug").and_then(Value::as_str) {
            Some(candidate) => self
                .categories
                .find_by_slug(candidate)
                .await
                .map_err(|err| DomainError::database("update", err, input.clone()))?
                .is_some_and(|other| other.id != id),
            None => false,
        };

        validation::validate(&input, &update_rules(slug_taken))?;
        self.fill_missing_slug(&mut input, Some(id), "update").await?;

        input.retain(|_, value| !value.is_null());
        let changes: CategoryChanges = serde_json::from_value(Value::Object(input.clone()))
            .map_err(|err| DomainError::generic(format!("invalid category payload: {err}")))?;
        let updated = self
            .categories
            .update(id, changes)
            .await
            .map_err(|err| DomainError::database("update", err, input))?;
        updated.ok_or_else(|| self.registry.not_found(Subject::Category, id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.get(id).await?;
        let removed = self
            .categories
            .delete(id)
            .await
            .map_err(|err| DomainError::database("delete", err, id_context(id)))?;
        if removed {
            Ok(())
        } else {
            Err(self.registry.not_found(Subject::Category, id))
        }
    }

    async fn fill_missing_slug(
        &self,
        input: &mut Map<String, Value>,
        exclude: Option<i64>,
        operation: &str,
    ) -> Result<(), DomainError> {
        let has_slug = input
            .get("slug")
            .and_then(Value::as_str)
            .is_some_and(|candidate| !candidate.is_empty());
        if has_slug {
            return Ok(());
        }
        let Some(name) = input.get("name").and_then(Value::as_str) else {
            return Ok(());
        };
        let derived = slug::slugify(name);
        let taken = self
            .categories
            .find_by_slug(&derived)
            .await
            .map_err(|err| DomainError::database(operation, err, input.clone()))?
            .is_some_and(|existing| exclude != Some(existing.id));
        let chosen = if taken {
            slug::with_timestamp_suffix(&derived, Utc::now())
        } else {
            derived
        };
        input.insert("slug".into(), json!(chosen));
        Ok(())
    }
}

fn create_rules(slug_taken: bool) -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            vec![
                Constraint::Required,
                Constraint::TypeOf(FieldType::String),
                Constraint::MaxLen(255),
            ],
        )
        .field(
            "slug",
            vec![
                Constraint::TypeOf(FieldType::String),
                Constraint::MaxLen(255),
                Constraint::Pattern(SLUG_PATTERN),
                Constraint::Unique { taken: slug_taken },
            ],
        )
        .field("description", vec![Constraint::TypeOf(FieldType::String)])
        .field("is_active", vec![Constraint::TypeOf(FieldType::Boolean)])
}

fn update_rules(slug_taken: bool) -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            vec![Constraint::TypeOf(FieldType::String), Constraint::MaxLen(255)],
        )
        .field(
            "slug",
            vec![
                Constraint::TypeOf(FieldType::String),
                Constraint::MaxLen(255),
                Constraint::Pattern(SLUG_PATTERN),
                Constraint::Unique { taken: slug_taken },
            ],
        )
        .field("description", vec![Constraint::TypeOf(FieldType::String)])
        .field("is_active", vec![Constraint::TypeOf(FieldType::Boolean)])
}

#[cfg(test)]
mod tests {
    //! Regression coverage for category use-cases.
    use super::*;
    use crate::outbound::memory::{
        InMemoryCategoryRepository, InMemoryPostRepository, InMemoryProductRepository,
    };

    fn service() -> CategoryService {
        CategoryService::new(
            Arc::new(InMemoryCategoryRepository::seeded()),
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
        )
    }

    fn input(name: &str) -> Map<String, Value> {
        let mut input = Map::new();
        input.insert("name".into(), json!(name));
        input
    }

    #[tokio::test]
    async fn create_derives_slug_from_name() {
        let service = service();
        let category = service.create(input("Home & Garden")).await.expect("create");
        assert_eq!(category.slug, "home-garden");
    }

    #[tokio::test]
    async fn derived_slug_collision_gets_timestamp_suffix() {
        let service = service();
        // "Books" is part of the seeded stock set, so the derived slug collides.
        let category = service.create(input("Books")).await.expect("create");
        assert_ne!(category.slug, "books");
        assert!(category.slug.starts_with("books-"));
    }

    #[tokio::test]
    async fn explicit_slug_collision_is_a_validation_error() {
        let service = service();
        let mut payload = input("Paperbacks");
        payload.insert("slug".into(), json!("books"));
        let err = service.create(payload).await.expect_err("slug taken");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_category_uses_specific_kind() {
        let service = service();
        let err = service.products_of(99).await.expect_err("unknown id");
        assert_eq!(err.code(), "CATEGORY_NOT_FOUND");
        assert_eq!(err.details().get("category_id"), Some(&json!(99)));
    }

    #[tokio::test]
    async fn blank_slug_lookup_is_rejected() {
        let service = service();
        let err = service.find_by_slug("  ").await.expect_err("blank slug");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn update_excludes_self_from_slug_collision() {
        let service = service();
        let mut payload = input("Books");
        payload.insert("slug".into(), json!("books"));
        let updated = service.update(3, payload).await.expect("update own slug");
        assert_eq!(updated.slug, "books", "a record may keep its own slug");
    }
}
