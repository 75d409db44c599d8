//! Domain error taxonomy.
//!
//! These errors are transport agnostic. Inbound adapters pair them with
//! request context and render the protocol-specific envelope; the domain
//! only decides *what* went wrong, never how it is serialized.
//!
//! The taxonomy is closed: every [`ErrorKind`] maps to exactly one HTTP
//! status code and one stable machine code. Clients branch on `code`;
//! message text may change, codes must not.

use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::Level;

/// Keys stripped from input snapshots before they are attached to an error.
const REDACTED_KEYS: &[&str] = &["password", "password_confirmation", "current_password", "token"];

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A resource lookup failed and no more specific kind is registered.
    NotFound,
    /// A product lookup failed.
    ProductNotFound,
    /// A category lookup failed.
    CategoryNotFound,
    /// Request payload validation collected one or more violations.
    ValidationFailed,
    /// Authentication is missing or invalid.
    Unauthorized,
    /// Authenticated but not permitted to perform the action.
    Forbidden,
    /// An opaque lower-level failure wrapped with operation context.
    DatabaseFailure,
    /// Anything else; carries a configurable status (default 500).
    Generic,
}

impl ErrorKind {
    /// Default HTTP status for the kind. Total: every kind has one.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::NotFound | Self::ProductNotFound | Self::CategoryNotFound => 404,
            Self::ValidationFailed => 422,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::DatabaseFailure | Self::Generic => 500,
        }
    }

    /// Stable machine code clients can branch on.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "RESOURCE_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::DatabaseFailure => "DATABASE_ERROR",
            Self::Generic => "GENERIC_ERROR",
        }
    }

    /// Kind name surfaced as the `type` field of the error payload.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::ProductNotFound => "ProductNotFound",
            Self::CategoryNotFound => "CategoryNotFound",
            Self::ValidationFailed => "ValidationFailed",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::DatabaseFailure => "DatabaseFailure",
            Self::Generic => "Generic",
        }
    }

    /// Default log severity for the kind.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::NotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::Unauthorized
            | Self::Forbidden => Level::WARN,
            Self::ValidationFailed => Level::INFO,
            Self::DatabaseFailure | Self::Generic => Level::ERROR,
        }
    }
}

/// Request metadata accompanying a boundary log record.
#[derive(Debug, Clone, Copy)]
pub struct LogContext<'a> {
    /// Acting user, if authenticated.
    pub actor_id: Option<i64>,
    /// Request path.
    pub endpoint: &'a str,
    /// Request method.
    pub method: &'a str,
}

/// Domain error payload.
///
/// Carries the taxonomy kind, a human message, a structured detail map,
/// the optionally wrapped lower-level cause, and the source location of
/// construction (surfaced only when debug output is enabled).
#[derive(Debug, Clone)]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
    status_override: Option<u16>,
    details: Map<String, Value>,
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
    location: &'static Location<'static>,
}

impl DomainError {
    /// Create an error of the given kind.
    #[track_caller]
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_override: None,
            details: Map::new(),
            source: None,
            location: Location::caller(),
        }
    }

    /// Generic not-found fallback used for subjects without a registered
    /// constructor. The subject's human name and id land in the message
    /// and details so clients still learn what was missing.
    #[track_caller]
    #[must_use]
    pub fn not_found(resource: &str, id: i64) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("{resource} with id {id} was not found."),
        )
        .with_detail("resource", json!(resource))
        .with_detail("id", json!(id))
    }

    /// Product lookup failure.
    #[track_caller]
    #[must_use]
    pub fn product_not_found(product_id: i64) -> Self {
        Self::new(
            ErrorKind::ProductNotFound,
            format!("Product with id {product_id} was not found."),
        )
        .with_detail("product_id", json!(product_id))
        .with_detail(
            "suggestion",
            json!("Check the product id or list the available products."),
        )
        .with_detail("help_url", json!("/api/products"))
    }

    /// Category lookup failure.
    #[track_caller]
    #[must_use]
    pub fn category_not_found(category_id: i64) -> Self {
        Self::new(
            ErrorKind::CategoryNotFound,
            format!("Category with id {category_id} was not found."),
        )
        .with_detail("category_id", json!(category_id))
        .with_detail("suggestion", json!("Check the category id."))
        .with_detail("help_url", json!("/api/categories"))
    }

    /// Validation failure carrying every collected violation.
    ///
    /// `errors` maps field name to the list of messages for that field;
    /// `error_count` is the total number of violations across all fields.
    #[track_caller]
    #[must_use]
    pub fn validation_failed(errors: Map<String, Value>) -> Self {
        let error_count: usize = errors
            .values()
            .map(|messages| messages.as_array().map_or(1, Vec::len))
            .sum();
        Self::new(ErrorKind::ValidationFailed, "Validation failed")
            .with_detail("errors", Value::Object(errors))
            .with_detail("error_count", json!(error_count))
            .with_detail(
                "suggestion",
                json!("Check the submitted fields and try again."),
            )
    }

    /// Missing or invalid authentication.
    #[track_caller]
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
            .with_detail("required_permission", json!("authenticated"))
            .with_detail("suggestion", json!("Log in or supply a valid API token."))
            .with_detail("login_url", json!("/api/auth/login"))
    }

    /// Authenticated but not permitted to perform `action`.
    #[track_caller]
    #[must_use]
    pub fn forbidden(action: &str, user_id: Option<i64>) -> Self {
        Self::new(
            ErrorKind::Forbidden,
            format!("You do not have permission to {action}."),
        )
        .with_detail("action", json!(action))
        .with_detail("user_id", json!(user_id))
        .with_detail(
            "suggestion",
            json!("Make sure you hold the required permissions for this action."),
        )
    }

    /// Wrap an opaque lower-level failure.
    ///
    /// Only unrecognized failures may be wrapped this way; typed
    /// [`DomainError`]s propagate unchanged and must never be laundered
    /// through this constructor. The original cause is retained and the
    /// attempted operation plus a redacted input snapshot land in details.
    #[track_caller]
    #[must_use]
    pub fn database(
        operation: &str,
        cause: impl std::error::Error + Send + Sync + 'static,
        input: Map<String, Value>,
    ) -> Self {
        let snapshot: Map<String, Value> = input
            .into_iter()
            .filter(|(key, _)| !REDACTED_KEYS.contains(&key.as_str()))
            .collect();
        Self::new(
            ErrorKind::DatabaseFailure,
            format!("Database error during {operation}"),
        )
        .with_detail("operation", json!(operation))
        .with_detail("input", Value::Object(snapshot))
        .with_source(cause)
    }

    /// Catch-all error; combine with [`DomainError::with_status`] when the
    /// default 500 does not fit.
    #[track_caller]
    #[must_use]
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    /// Override the HTTP status (meaningful for [`ErrorKind::Generic`]).
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_override = Some(status);
        self
    }

    /// Attach a single structured detail.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_owned(), value);
        self
    }

    /// Merge a detail map into the error.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details.extend(details);
        self
    }

    /// Retain a lower-level cause.
    #[must_use]
    pub fn with_source(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(cause));
        self
    }

    /// Taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Stable machine code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Effective HTTP status, honouring any override.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_override.unwrap_or_else(|| self.kind.status_code())
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured details for the error payload.
    #[must_use]
    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    /// Source file of the construction site.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    /// Source line of the construction site.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    /// Formatted cause chain, outermost first.
    #[must_use]
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current: Option<&(dyn std::error::Error + 'static)> =
            self.source.as_deref().map(|err| err as &(dyn std::error::Error + 'static));
        while let Some(err) = current {
            chain.push(err.to_string());
            current = err.source();
        }
        chain
    }

    /// Emit one structured log record at the kind's severity.
    ///
    /// The record always carries the actor id (nullable), request path,
    /// method, and the detail map. Logging never fails: the subscriber
    /// swallows sink errors.
    pub fn log(&self, ctx: &LogContext<'_>) {
        self.log_at(self.kind.level(), ctx);
    }

    /// Emit the log record at an explicit severity.
    pub fn log_at(&self, level: Level, ctx: &LogContext<'_>) {
        let details = Value::Object(self.details.clone());
        match level {
            Level::ERROR => tracing::error!(
                code = self.code(),
                status = self.status_code(),
                actor_id = ctx.actor_id,
                endpoint = ctx.endpoint,
                method = ctx.method,
                details = %details,
                "{}",
                self.message
            ),
            Level::WARN => tracing::warn!(
                code = self.code(),
                status = self.status_code(),
                actor_id = ctx.actor_id,
                endpoint = ctx.endpoint,
                method = ctx.method,
                details = %details,
                "{}",
                self.message
            ),
            Level::INFO => tracing::info!(
                code = self.code(),
                status = self.status_code(),
                actor_id = ctx.actor_id,
                endpoint = ctx.endpoint,
                method = ctx.method,
                details = %details,
                "{}",
                self.message
            ),
            _ => tracing::debug!(
                code = self.code(),
                status = self.status_code(),
                actor_id = ctx.actor_id,
                endpoint = ctx.endpoint,
                method = ctx.method,
                details = %details,
                "{}",
                self.message
            ),
        }
    }
}

impl PartialEq for DomainError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.message == other.message
            && self.status_override == other.status_override
            && self.details == other.details
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Domain entity involved in a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Product,
    Category,
    Post,
}

impl Subject {
    /// Human name embedded in fallback not-found messages.
    #[must_use]
    pub fn human_name(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Category => "Category",
            Self::Post => "Post",
        }
    }
}

/// Constructor signature for subject-specific not-found errors.
pub type NotFoundCtor = fn(i64) -> DomainError;

/// Registry selecting the most specific not-found kind for a subject.
///
/// Subjects without an entry fall back to the generic [`ErrorKind::NotFound`]
/// with the subject's human name and id embedded. Built once at process
/// start and treated as immutable configuration afterwards.
#[derive(Debug, Clone)]
pub struct NotFoundRegistry {
    entries: HashMap<Subject, NotFoundCtor>,
}

impl Default for NotFoundRegistry {
    fn default() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };
        registry.register(Subject::Product, DomainError::product_not_found);
        registry.register(Subject::Category, DomainError::category_not_found);
        registry
    }
}

impl NotFoundRegistry {
    /// Bind a subject to a specific not-found constructor.
    pub fn register(&mut self, subject: Subject, ctor: NotFoundCtor) {
        self.entries.insert(subject, ctor);
    }

    /// Build the most specific not-found error registered for `subject`.
    #[must_use]
    pub fn not_found(&self, subject: Subject, id: i64) -> DomainError {
        match self.entries.get(&subject) {
            Some(ctor) => ctor(id),
            None => DomainError::not_found(subject.human_name(), id),
        }
    }
}
