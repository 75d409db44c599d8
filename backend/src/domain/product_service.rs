//! Product use-cases: listing, lookups, and validated CRUD.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::domain::error::{DomainError, ErrorKind, NotFoundRegistry, Subject};
use crate::domain::ports::{CategoryRepository, ProductRepository};
use crate::domain::product::{NewProduct, Product, ProductChanges, ProductFilter};
use crate::domain::slug;
use crate::domain::validation::{self, Constraint, FieldType, NamedPattern, RuleSet, Violations};

pub(crate) const SLUG_PATTERN: NamedPattern = NamedPattern {
    name: "slug",
    matches: slug::is_valid_slug,
};

pub(crate) fn id_context(id: i64) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert("id".into(), json!(id));
    context
}

/// CRUD and query operations over products.
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    registry: NotFoundRegistry,
}

impl ProductService {
    #[must_use]
    pub fn new(products: Arc<dyn ProductRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self {
            products,
            categories,
            registry: NotFoundRegistry::default(),
        }
    }

    /// List products matching the filter.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        match filter {
            ProductFilter::Category(id) if *id <= 0 => {
                let mut violations = Violations::default();
                violations.add("category_id", "category_id must be a positive integer");
                Err(violations.into_error())
            }
            ProductFilter::Search(term) if term.trim().chars().count() < 2 => {
                let mut violations = Violations::default();
                violations.add("search", "search term must be at least 2 characters");
                Err(violations.into_error())
            }
            _ => self
                .products
                .list(filter)
                .await
                .map_err(|err| DomainError::database("list", err, Map::new())),
        }
    }

    /// Fetch one product; unknown ids resolve through the not-found registry.
    pub async fn get(&self, id: i64) -> Result<Product, DomainError> {
        let found = self
            .products
            .find_by_id(id)
            .await
            .map_err(|err| DomainError::database("find", err, id_context(id)))?;
        match found {
            Some(product) => Ok(product),
            None => Err(self.not_found(id).await),
        }
    }

    /// Fetch one product by SKU.
    pub async fn find_by_sku(&self, sku: &str) -> Result<Product, DomainError> {
        let sku = sku.trim();
        if sku.is_empty() {
            let mut violations = Violations::default();
            violations.add("sku", "sku must not be blank");
            return Err(violations.into_error());
        }
        let mut context = Map::new();
        context.insert("sku".into(), json!(sku));
        let found = self
            .products
            .find_by_sku(sku)
            .await
            .map_err(|err| DomainError::database("find", err, context))?;
        found.ok_or_else(|| {
            DomainError::new(
                ErrorKind::ProductNotFound,
                format!("Product with SKU '{sku}' was not found."),
            )
            .with_detail("sku", json!(sku))
            .with_detail(
                "suggestion",
                json!("Check the SKU or list the available products."),
            )
        })
    }

    /// Validate and persist a new product.
    pub async fn create(&self, input: Map<String, Value>) -> Result<Product, DomainError> {
        let mut input = input;
        validation::normalize(&mut input);

        let sku_taken = match input.get("sku").and_then(Value::as_str) {
            Some(sku) => self
                .products
                .find_by_sku(sku)
                .await
                .map_err(|err| DomainError::database("create", err, input.clone()))?
                .is_some(),
            None => false,
        };
        let slug_taken = match input.get("slug").and_then(Value::as_str) {
            Some(candidate) => self
                .products
                .find_by_slug(candidate)
                .await
                .map_err(|err| DomainError::database("create", err, input.clone()))?
                .is_some(),
            None => false,
        };
        let category_found = match input.get("category_id").and_then(Value::as_i64) {
            Some(id) => self
                .categories
                .exists(id)
                .await
                .map_err(|err| DomainError::database("create", err, input.clone()))?,
            None => true,
        };

        validation::validate(&input, &create_rules(sku_taken, slug_taken, category_found))?;
        self.fill_missing_slug(&mut input, None, "create").await?;

        input.retain(|_, value| !value.is_null());
        let draft: NewProduct = serde_json::from_value(Value::Object(input.clone()))
            .map_err(|err| DomainError::generic(format!("invalid product payload: {err}")))?;
        self.products
            .insert(draft)
            .await
            .map_err(|err| DomainError::database("create", err, input))
    }

    /// Validate and apply a partial update.
    pub async fn update(&self, id: i64, input: Map<String, Value>) -> Result<Product, DomainError> {
        self.get(id).await?;

        let mut input = input;
        validation::normalize(&mut input);

        let sku_taken = match input.get("sku").and_then(Value::as_str) {
            Some(sku) => self
                .products
                .find_by_sku(sku)
                .await
                .map_err(|err| DomainError::database("update", err, input.clone()))?
                .is_some_and(|other| other.id != id),
            None => false,
        };
        let slug_taken = match input.get("slug").and_then(Value::as_str) {
            Some(candidate) => self
                .products
                .find_by_slug(candidate)
                .await
                .map_err(|err| DomainError::database("update", err, input.clone()))?
                .is_some_and(|other| other.id != id),
            None => false,
        };
        let category_found = match input.get("category_id").and_then(Value::as_i64) {
            Some(category_id) => self
                .categories
                .exists(category_id)
                .await
                .map_err(|err| DomainError::database("update", err, input.clone()))?,
            None => true,
        };

        validation::validate(&input, &update_rules(sku_taken, slug_taken, category_found))?;
        self.fill_missing_slug(&mut input, Some(id), "update").await?;

        input.retain(|_, value| !value.is_null());
        let changes: ProductChanges = serde_json::from_value(Value::Object(input.clone()))
            .map_err(|err| DomainError::generic(format!("invalid product payload: {err}")))?;
        let updated = self
            .products
            .update(id, changes)
            .await
            .map_err(|err| DomainError::database("update", err, input))?;
        match updated {
            Some(product) => Ok(product),
            None => Err(self.not_found(id).await),
        }
    }

    /// Remove a product.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.get(id).await?;
        let removed = self
            .products
            .delete(id)
            .await
            .map_err(|err| DomainError::database("delete", err, id_context(id)))?;
        if removed {
            Ok(())
        } else {
            Err(self.not_found(id).await)
        }
    }

    async fn not_found(&self, id: i64) -> DomainError {
        let mut err = self.registry.not_found(Subject::Product, id);
        // The candidate count is advisory; a failing count never masks the 404.
        if let Ok(count) = self.products.count().await {
            err = err.with_detail("candidate_count", json!(count));
        }
        err
    }

    /// Derived-field default: slug from name, with a single collision probe.
    /// The timestamp-suffixed fallback is not re-checked.
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
            .products
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

fn create_rules(sku_taken: bool, slug_taken: bool, category_found: bool) -> RuleSet {
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
        .field(
            "description",
            vec![Constraint::Required, Constraint::TypeOf(FieldType::String)],
        )
        .field(
            "price",
            vec![
                Constraint::Required,
                Constraint::TypeOf(FieldType::Number),
                Constraint::Min(0.0),
            ],
        )
        .field(
            "quantity",
            vec![
                Constraint::Required,
                Constraint::TypeOf(FieldType::Integer),
                Constraint::Min(0.0),
            ],
        )
        .field(
            "sku",
            vec![
                Constraint::TypeOf(FieldType::String),
                Constraint::MaxLen(100),
                Constraint::Unique { taken: sku_taken },
            ],
        )
        .field(
            "category_id",
            vec![
                Constraint::Required,
                Constraint::TypeOf(FieldType::Integer),
                Constraint::Exists {
                    found: category_found,
                },
            ],
        )
        .field("is_active", vec![Constraint::TypeOf(FieldType::Boolean)])
}

fn update_rules(sku_taken: bool, slug_taken: bool, category_found: bool) -> RuleSet {
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
        .field(
            "price",
            vec![Constraint::TypeOf(FieldType::Number), Constraint::Min(0.0)],
        )
        .field(
            "quantity",
            vec![Constraint::TypeOf(FieldType::Integer), Constraint::Min(0.0)],
        )
        .field(
            "sku",
            vec![
                Constraint::TypeOf(FieldType::String),
                Constraint::MaxLen(100),
                Constraint::Unique { taken: sku_taken },
            ],
        )
        .field(
            "category_id",
            vec![
                Constraint::TypeOf(FieldType::Integer),
                Constraint::Exists {
                    found: category_found,
                },
            ],
        )
        .field("is_active", vec![Constraint::TypeOf(FieldType::Boolean)])
}
