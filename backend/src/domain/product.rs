//! Product entity and its write shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalogue product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub category_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Active and in stock.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_active && self.quantity > 0
    }
}

/// Validated payload for creating a product.
///
/// Deserialized from the pipeline's normalized output; the rule set has
/// already established presence and types.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub sku: Option<String>,
    pub category_id: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update payload; absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Listing filter derived from query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProductFilter {
    #[default]
    All,
    /// `is_active` only.
    Active,
    /// Active and in stock.
    Available,
    /// Belonging to one category.
    Category(i64),
    /// Name/description substring match over active products.
    Search(String),
}
