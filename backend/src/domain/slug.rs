//! Slug derivation for sluggable entities.
//!
//! Slugs are derived deterministically from a source field: lowercase,
//! non-alphanumeric runs collapsed into single hyphens, no edge hyphens.
//! Collisions are resolved by appending a timestamp suffix after a single
//! lookup against the store; the suffixed value is not re-checked, so
//! uniqueness is best effort rather than strict.

use chrono::{DateTime, Utc};

/// Derive a slug from free-form text.
#[must_use]
pub fn slugify(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    let mut pending_hyphen = false;
    for ch in source.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Disambiguate a colliding slug with a monotonic timestamp suffix.
#[must_use]
pub fn with_timestamp_suffix(slug: &str, now: DateTime<Utc>) -> String {
    format!("{slug}-{}", now.timestamp())
}

/// Predicate backing the slug pattern constraint.
#[must_use]
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
