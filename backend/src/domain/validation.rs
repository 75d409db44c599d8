//! Request payload normalization and validation.
//!
//! The pipeline runs a fixed stage order over raw key-value input:
//! trim, blank-to-null, boolean coercion, then rule evaluation. Rule
//! evaluation never short-circuits: every violation across every field is
//! collected so a client gets the complete picture in one round trip.
//!
//! Rule sets are built per request at dispatch time and discarded when the
//! request completes. Constraints that need external facts (uniqueness,
//! foreign existence) receive the answer of a single prefetched lookup
//! instead of performing I/O themselves, which keeps evaluation pure.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::domain::error::DomainError;

/// Field names subject to boolean coercion during normalization.
pub const BOOLEAN_FIELDS: &[&str] = &["active", "enabled", "is_active", "is_published", "status"];

/// Expected JSON type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "true or false",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Named string predicate used by pattern constraints.
#[derive(Clone, Copy)]
pub struct NamedPattern {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
}

impl std::fmt::Debug for NamedPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedPattern").field("name", &self.name).finish()
    }
}

/// One constraint in a field's rule sequence.
///
/// `Unique` and `Exists` carry the result of the caller's single external
/// lookup; evaluation itself stays side-effect free.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value must be present and non-null.
    Required,
    /// Value, when present, must have the given JSON type.
    TypeOf(FieldType),
    /// Minimum string length in characters.
    MinLen(usize),
    /// Maximum string length in characters.
    MaxLen(usize),
    /// Minimum numeric value (inclusive).
    Min(f64),
    /// Maximum numeric value (inclusive).
    Max(f64),
    /// Value must satisfy the named predicate.
    Pattern(NamedPattern),
    /// Prefetched uniqueness probe: `taken` is true when the value already
    /// belongs to another record.
    Unique { taken: bool },
    /// Prefetched foreign lookup: `found` is false when the referenced
    /// record does not exist.
    Exists { found: bool },
}

/// Constraints attached to a single field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    name: &'static str,
    constraints: Vec<Constraint>,
}

/// Rule evaluated against the whole payload after per-field constraints.
#[derive(Clone)]
pub struct CrossRule {
    pub field: &'static str,
    pub message: &'static str,
    /// Returns true when the payload satisfies the rule.
    pub check: fn(&Map<String, Value>) -> bool,
}

impl std::fmt::Debug for CrossRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossRule").field("field", &self.field).finish()
    }
}

/// Ordered rule set for one request shape.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
    cross: Vec<CrossRule>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field with its constraint sequence.
    #[must_use]
    pub fn field(mut self, name: &'static str, constraints: Vec<Constraint>) -> Self {
        self.fields.push(FieldRules { name, constraints });
        self
    }

    /// Append a cross-field rule.
    #[must_use]
    pub fn cross(mut self, rule: CrossRule) -> Self {
        self.cross.push(rule);
        self
    }
}

/// Accumulated violations keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    errors: BTreeMap<String, Vec<String>>,
}

impl Violations {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_owned()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of collected messages across all fields.
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Convert into the taxonomy's validation error.
    #[must_use]
    pub fn into_error(self) -> DomainError {
        let errors: Map<String, Value> = self
            .errors
            .into_iter()
            .map(|(field, messages)| (field, json!(messages)))
            .collect();
        DomainError::validation_failed(errors)
    }
}

/// Stages 1-3: trim strings, blank-to-null, boolean coercion.
pub fn normalize(input: &mut Map<String, Value>) {
    for value in input.values_mut() {
        if let Value::String(text) = value {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *value = Value::String(trimmed.to_owned());
            }
        }
    }
    for value in input.values_mut() {
        if value.as_str() == Some("") {
            *value = Value::Null;
        }
    }
    for &field in BOOLEAN_FIELDS {
        let Some(value) = input.get_mut(field) else {
            continue;
        };
        let Some(text) = value.as_str() else { continue };
        match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => *value = Value::Bool(true),
            "false" | "0" | "no" | "off" => *value = Value::Bool(false),
            // Unrecognized values stay as-is for the type check to reject.
            _ => {}
        }
    }
}

/// Stage 4: evaluate every constraint of every field, collecting all
/// violations, then run cross-field rules. At least one violation yields
/// `VALIDATION_ERROR` and the caller must not execute the operation.
pub fn validate(input: &Map<String, Value>, rules: &RuleSet) -> Result<(), DomainError> {
    let mut violations = Violations::default();
    for field in &rules.fields {
        evaluate_field(input, field, &mut violations);
    }
    for rule in &rules.cross {
        if !(rule.check)(input) {
            violations.add(rule.field, rule.message);
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.into_error())
    }
}

/// Run normalization then rule evaluation, returning the normalized payload.
pub fn run(mut input: Map<String, Value>, rules: &RuleSet) -> Result<Map<String, Value>, DomainError> {
    normalize(&mut input);
    validate(&input, rules)?;
    Ok(input)
}

fn evaluate_field(input: &Map<String, Value>, field: &FieldRules, violations: &mut Violations) {
    let name = field.name;
    let value = input.get(name).filter(|v| !v.is_null());
    for constraint in &field.constraints {
        match (constraint, value) {
            (Constraint::Required, None) => {
                violations.add(name, format!("{name} is required"));
            }
            // Remaining constraints only apply to present values.
            (_, None) => {}
            (Constraint::Required, Some(_)) => {}
            (Constraint::TypeOf(expected), Some(value)) => {
                if !expected.matches(value) {
                    violations.add(name, format!("{name} must be {}", expected.describe()));
                }
            }
            (Constraint::MinLen(min), Some(value)) => {
                if value.as_str().is_some_and(|text| text.chars().count() < *min) {
                    violations.add(name, format!("{name} must be at least {min} characters"));
                }
            }
            (Constraint::MaxLen(max), Some(value)) => {
                if value.as_str().is_some_and(|text| text.chars().count() > *max) {
                    violations.add(name, format!("{name} may not be longer than {max} characters"));
                }
            }
            (Constraint::Min(min), Some(value)) => {
                if value.as_f64().is_some_and(|number| number < *min) {
                    violations.add(name, format!("{name} must be at least {min}"));
                }
            }
            (Constraint::Max(max), Some(value)) => {
                if value.as_f64().is_some_and(|number| number > *max) {
                    violations.add(name, format!("{name} may not be greater than {max}"));
                }
            }
            (Constraint::Pattern(pattern), Some(value)) => {
                if value.as_str().is_some_and(|text| !(pattern.matches)(text)) {
                    violations.add(name, format!("{name} must be a valid {}", pattern.name));
                }
            }
            (Constraint::Unique { taken: true }, Some(_)) => {
                violations.add(name, format!("{name} has already been taken"));
            }
            (Constraint::Unique { taken: false }, Some(_)) => {}
            (Constraint::Exists { found: false }, Some(_)) => {
                violations.add(name, format!("the selected {name} does not exist"));
            }
            (Constraint::Exists { found: true }, Some(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests;
