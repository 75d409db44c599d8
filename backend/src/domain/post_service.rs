//! Post use-cases: validated CRUD plus the publish/unpublish transitions.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::domain::error::{DomainError, ErrorKind, NotFoundRegistry, Subject};
use crate::domain::ports::{CategoryRepository, PostRepository};
use crate::domain::post::{self, NewPost, Post, PostChanges, PostFilter};
use crate::domain::product_service::{SLUG_PATTERN, id_context};
use crate::domain::slug;
use crate::domain::validation::{self, Constraint, CrossRule, FieldType, NamedPattern, RuleSet, Violations};

const TIMESTAMP_PATTERN: NamedPattern = NamedPattern {
    name: "RFC 3339 timestamp",
    matches: is_rfc3339,
};

fn is_rfc3339(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

/// `published_at` may only be supplied for a published post.
const PUBLISHED_AT_RULE: CrossRule = CrossRule {
    field: "published_at",
    message: "published_at requires is_published to be true",
    check: |payload| {
        payload.get("published_at").is_none_or(Value::is_null)
            || payload.get("is_published").and_then(Value::as_bool) == Some(true)
    },
};

/// CRUD and publishing operations over posts.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    registry: NotFoundRegistry,
}

impl PostService {
    #[must_use]
    pub fn new(posts: Arc<dyn PostRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self {
            posts,
            categories,
            registry: NotFoundRegistry::default(),
        }
    }

    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        match filter {
            PostFilter::User(id) if *id <= 0 => {
                let mut violations = Violations::default();
                violations.add("user_id", "user_id must be a positive integer");
                Err(violations.into_error())
            }
            PostFilter::Category(id) if *id <= 0 => {
                let mut violations = Violations::default();
                violations.add("category_id", "category_id must be a positive integer");
                Err(violations.into_error())
            }
            _ => self
                .posts
                .list(filter)
                .await
                .map_err(|err| DomainError::database("list", err, Map::new())),
        }
    }

    /// Fetch one post; posts have no dedicated not-found kind, so unknown
    /// ids resolve through the registry's generic fallback.
    pub async fn get(&self, id: i64) -> Result<Post, DomainError> {
        let found = self
            .posts
            .find_by_id(id)
            .await
            .map_err(|err| DomainError::database("find", err, id_context(id)))?;
        found.ok_or_else(|| self.registry.not_found(Subject::Post, id))
    }

    pub async fn find_by_slug(&self, candidate: &str) -> Result<Post, DomainError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            let mut violations = Violations::default();
            violations.add("slug", "slug must not be blank");
            return Err(violations.into_error());
        }
        let mut context = Map::new();
        context.insert("slug".into(), json!(candidate));
        let found = self
            .posts
            .find_by_slug(candidate)
            .await
            .map_err(|err| DomainError::database("find", err, context))?;
        found.ok_or_else(|| {
            DomainError::new(
                ErrorKind::NotFound,
                format!("Post with slug '{candidate}' was not found."),
            )
            .with_detail("resource", json!("Post"))
            .with_detail("slug", json!(candidate))
        })
    }

    pub async fn create(&self, input: Map<String, Value>) -> Result<Post, DomainError> {
        let mut input = input;
        validation::normalize(&mut input);

        let slug_taken = match input.get("slug").and_then(Value::as_str) {
            Some(candidate) => self
                .posts
                .find_by_slug(candidate)
                .await
                .map_err(|err| DomainError::database("create", err, input.clone()))?
                .is_some(),
            None => false,
        };
        let category_found = match input.get("category_id").and_then(Value::as_i64) {
            Some(category_id) => self
                .categories
                .exists(category_id)
                .await
                .map_err(|err| DomainError::database("create", err, input.clone()))?,
            None => true,
        };

        validation::validate(&input, &create_rules(slug_taken, category_found))?;
        self.fill_missing_slug(&mut input, None, "create").await?;
        fill_derived_fields(&mut input);

        input.retain(|_, value| !value.is_null());
        let draft: NewPost = serde_json::from_value(Value::Object(input.clone()))
            .map_err(|err| DomainError::generic(format!("invalid post payload: {err}")))?;
        self.posts
            .insert(draft)
            .await
            .map_err(|err| DomainError::database("create", err, input))
    }

    pub async fn update(&self, id: i64, input: Map<String, Value>) -> Result<Post, DomainError> {
        self.get(id).await?;

        let mut input = input;
        validation::normalize(&mut input);

        let slug_taken = match input.get("slug").and_then(Value::as_str) {
            Some(candidate) => self
                .posts
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

        validation::validate(&input, &update_rules(slug_taken, category_found))?;
        self.fill_missing_slug(&mut input, Some(id), "update").await?;
        fill_derived_fields(&mut input);

        // An explicit unpublish clears the publication timestamp.
        let clear_published_at =
            input.get("is_published").and_then(Value::as_bool) == Some(false);

        input.retain(|_, value| !value.is_null());
        let mut changes: PostChanges = serde_json::from_value(Value::Object(input.clone()))
            .map_err(|err| DomainError::generic(format!("invalid post payload: {err}")))?;
        changes.clear_published_at = clear_published_at;
        let updated = self
            .posts
            .update(id, changes)
            .await
            .map_err(|err| DomainError::database("update", err, input))?;
        updated.ok_or_else(|| self.registry.not_found(Subject::Post, id))
    }

    /// Mark a post published, stamping `published_at` when absent.
    pub async fn publish(&self, id: i64) -> Result<Post, DomainError> {
        let existing = self.get(id).await?;
        let changes = PostChanges {
            is_published: Some(true),
            published_at: existing.published_at.or_else(|| Some(Utc::now())),
            ..PostChanges::default()
        };
        let updated = self
            .posts
            .update(id, changes)
            .await
            .map_err(|err| DomainError::database("publish", err, id_context(id)))?;
        updated.ok_or_else(|| self.registry.not_found(Subject::Post, id))
    }

    /// Mark a post unpublished and clear its publication timestamp.
    pub async fn unpublish(&self, id: i64) -> Result<Post, DomainError> {
        self.get(id).await?;
        let changes = PostChanges {
            is_published: Some(false),
            clear_published_at: true,
            ..PostChanges::default()
        };
        let updated = self
            .posts
            .update(id, changes)
            .await
            .map_err(|err| DomainError::database("unpublish", err, id_context(id)))?;
        updated.ok_or_else(|| self.registry.not_found(Subject::Post, id))
    }

    /// Remove a post. Published posts are refused until unpublished.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let existing = self.get(id).await?;
        if existing.is_published {
            return Err(DomainError::generic(
                "Cannot delete a published post. Unpublish it first.",
            )
            .with_status(409)
            .with_detail("post_id", json!(id)));
        }
        let removed = self
            .posts
            .delete(id)
            .await
            .map_err(|err| DomainError::database("delete", err, id_context(id)))?;
        if removed {
            Ok(())
        } else {
            Err(self.registry.not_found(Subject::Post, id))
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
        let Some(title) = input.get("title").and_then(Value::as_str) else {
            return Ok(());
        };
        let derived = slug::slugify(title);
        let taken = self
            .posts
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

/// Excerpt from content when absent; publication timestamp when publishing.
fn fill_derived_fields(input: &mut Map<String, Value>) {
    let has_excerpt = input
        .get("excerpt")
        .and_then(Value::as_str)
        .is_some_and(|text| !text.is_empty());
    if !has_excerpt {
        if let Some(content) = input.get("content").and_then(Value::as_str) {
            input.insert("excerpt".into(), json!(post::derive_excerpt(content)));
        }
    }

    let publishing = input.get("is_published").and_then(Value::as_bool) == Some(true);
    let has_published_at = input
        .get("published_at")
        .is_some_and(|value| !value.is_null());
    if publishing && !has_published_at {
        input.insert("published_at".into(), json!(Utc::now()));
    }
}

fn create_rules(slug_taken: bool, category_found: bool) -> RuleSet {
    RuleSet::new()
        .field(
            "title",
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
            "content",
            vec![Constraint::Required, Constraint::TypeOf(FieldType::String)],
        )
        .field(
            "excerpt",
            vec![Constraint::TypeOf(FieldType::String), Constraint::MaxLen(500)],
        )
        .field(
            "user_id",
            vec![
                Constraint::Required,
                Constraint::TypeOf(FieldType::Integer),
                Constraint::Min(1.0),
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
        .field(
            "published_at",
            vec![
                Constraint::TypeOf(FieldType::String),
                Constraint::Pattern(TIMESTAMP_PATTERN),
            ],
        )
        .field("is_published", vec![Constraint::TypeOf(FieldType::Boolean)])
        .cross(PUBLISHED_AT_RULE)
}

fn update_rules(slug_taken: bool, category_found: bool) -> RuleSet {
    RuleSet::new()
        .field(
            "title",
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
        .field("content", vec![Constraint::TypeOf(FieldType::String)])
        .field(
            "excerpt",
            vec![Constraint::TypeOf(FieldType::String), Constraint::MaxLen(500)],
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
        .field(
            "published_at",
            vec![
                Constraint::TypeOf(FieldType::String),
                Constraint::Pattern(TIMESTAMP_PATTERN),
            ],
        )
        .field("is_published", vec![Constraint::TypeOf(FieldType::Boolean)])
        .cross(PUBLISHED_AT_RULE)
}

#[cfg(test)]
mod tests;
