//! Post entity, its write shapes, and excerpt derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum derived excerpt length in characters, ellipsis included.
const EXCERPT_LIMIT: usize = 150;

/// Blog post attached to a category and an authoring user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub user_id: i64,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated payload for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub user_id: i64,
    pub category_id: i64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_published: bool,
}

/// Partial update payload; absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_published: Option<bool>,
    /// Set by the service when an update must null out `published_at`;
    /// `Option<DateTime>` alone cannot distinguish "unchanged" from "clear".
    #[serde(skip)]
    pub clear_published_at: bool,
}

/// Listing filter derived from query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PostFilter {
    #[default]
    All,
    Published,
    User(i64),
    Category(i64),
}

/// Derive an excerpt from post content: markup tags stripped, truncated to
/// 150 characters with a trailing ellipsis when cut.
#[must_use]
pub fn derive_excerpt(content: &str) -> String {
    let mut plain = String::with_capacity(content.len());
    let mut in_tag = false;
    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => plain.push(ch),
            _ => {}
        }
    }
    let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");
    if plain.chars().count() <= EXCERPT_LIMIT {
        return plain;
    }
    let cut: String = plain.chars().take(EXCERPT_LIMIT - 3).collect();
    format!("{}...", cut.trim_end())
}
