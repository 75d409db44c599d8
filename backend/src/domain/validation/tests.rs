//! Regression coverage for the validation pipeline.

use super::*;
use rstest::rstest;

fn name_required() -> RuleSet {
    RuleSet::new().field(
        "name",
        vec![Constraint::Required, Constraint::TypeOf(FieldType::String)],
    )
}

fn errors_of(err: &DomainError) -> Map<String, Value> {
    err.details()
        .get("errors")
        .and_then(Value::as_object)
        .cloned()
        .expect("errors detail")
}

#[test]
fn trim_then_blank_to_null_fails_required() {
    let mut input = Map::new();
    input.insert("name".into(), json!("  "));

    let err = run(input, &name_required()).expect_err("blank name must fail");
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(err.details().get("error_count"), Some(&json!(1)));
    let errors = errors_of(&err);
    let messages = errors.get("name").and_then(Value::as_array).expect("name messages");
    assert!(!messages.is_empty());
}

#[test]
fn trim_preserves_inner_whitespace() {
    let mut input = Map::new();
    input.insert("name".into(), json!("  Mechanical Keyboard  "));
    normalize(&mut input);
    assert_eq!(input.get("name"), Some(&json!("Mechanical Keyboard")));
}

#[rstest]
#[case(json!("yes"), json!(true))]
#[case(json!("ON"), json!(true))]
#[case(json!("1"), json!(true))]
#[case(json!("off"), json!(false))]
#[case(json!("No"), json!(false))]
#[case(json!("0"), json!(false))]
fn boolean_coercion_recognizes_aliases(#[case] raw: Value, #[case] expected: Value) {
    let mut input = Map::new();
    input.insert("is_active".into(), raw);
    normalize(&mut input);
    assert_eq!(input.get("is_active"), Some(&expected));
}

#[test]
fn boolean_coercion_leaves_unrecognized_values_for_type_check() {
    let mut input = Map::new();
    input.insert("is_active".into(), json!("maybe"));
    normalize(&mut input);
    assert_eq!(input.get("is_active"), Some(&json!("maybe")));

    let rules = RuleSet::new().field("is_active", vec![Constraint::TypeOf(FieldType::Boolean)]);
    let err = validate(&input, &rules).expect_err("'maybe' is not a boolean");
    let errors = errors_of(&err);
    assert!(errors.contains_key("is_active"));
}

#[test]
fn boolean_coercion_only_touches_configured_fields() {
    let mut input = Map::new();
    input.insert("description".into(), json!("yes"));
    normalize(&mut input);
    assert_eq!(input.get("description"), Some(&json!("yes")));
}

#[test]
fn all_violations_are_collected_without_short_circuit() {
    let mut input = Map::new();
    input.insert("price".into(), json!(-10.0));

    let rules = RuleSet::new()
        .field("name", vec![Constraint::Required])
        .field(
            "price",
            vec![
                Constraint::Required,
                Constraint::TypeOf(FieldType::Number),
                Constraint::Min(0.0),
            ],
        );

    let err = run(input, &rules).expect_err("two violations expected");
    let errors = errors_of(&err);
    assert!(errors.contains_key("name"), "missing name reported");
    assert!(errors.contains_key("price"), "negative price reported");
    assert_eq!(err.details().get("error_count"), Some(&json!(2)));
}

#[rstest]
#[case(json!(3), FieldType::Integer, true)]
#[case(json!(3.5), FieldType::Integer, false)]
#[case(json!(3.5), FieldType::Number, true)]
#[case(json!("3"), FieldType::Number, false)]
#[case(json!(true), FieldType::Boolean, true)]
#[case(json!("tall"), FieldType::String, true)]
fn type_checks_match_json_types(
    #[case] value: Value,
    #[case] expected: FieldType,
    #[case] ok: bool,
) {
    let mut input = Map::new();
    input.insert("field".into(), value);
    let rules = RuleSet::new().field("field", vec![Constraint::TypeOf(expected)]);
    assert_eq!(validate(&input, &rules).is_ok(), ok);
}

#[test]
fn optional_constraints_skip_absent_fields() {
    let input = Map::new();
    let rules = RuleSet::new().field(
        "sku",
        vec![
            Constraint::TypeOf(FieldType::String),
            Constraint::MaxLen(100),
            Constraint::Unique { taken: true },
        ],
    );
    assert!(validate(&input, &rules).is_ok());
}

#[test]
fn length_bounds_count_characters() {
    let mut input = Map::new();
    input.insert("name".into(), json!("ab"));
    let rules = RuleSet::new().field("name", vec![Constraint::MinLen(3), Constraint::MaxLen(255)]);
    let err = validate(&input, &rules).expect_err("too short");
    assert!(errors_of(&err).contains_key("name"));
}

#[test]
fn unique_constraint_reports_prefetched_collision() {
    let mut input = Map::new();
    input.insert("sku".into(), json!("IP15001"));
    let rules = RuleSet::new().field("sku", vec![Constraint::Unique { taken: true }]);
    let err = validate(&input, &rules).expect_err("taken sku");
    let messages = errors_of(&err);
    let text = messages.get("sku").and_then(Value::as_array).expect("sku messages");
    assert_eq!(text[0], json!("sku has already been taken"));
}

#[test]
fn exists_constraint_reports_missing_foreign_record() {
    let mut input = Map::new();
    input.insert("category_id".into(), json!(99));
    let rules = RuleSet::new().field("category_id", vec![Constraint::Exists { found: false }]);
    let err = validate(&input, &rules).expect_err("missing category");
    assert!(errors_of(&err).contains_key("category_id"));
}

#[test]
fn cross_rules_run_after_field_rules() {
    let mut input = Map::new();
    input.insert("published_at".into(), json!("2026-01-01T00:00:00Z"));
    input.insert("is_published".into(), json!(false));

    let rules = RuleSet::new().cross(CrossRule {
        field: "published_at",
        message: "published_at requires is_published to be true",
        check: |payload| {
            payload.get("published_at").is_none_or(Value::is_null)
                || payload.get("is_published").and_then(Value::as_bool) == Some(true)
        },
    });

    let err = validate(&input, &rules).expect_err("cross rule violated");
    assert!(errors_of(&err).contains_key("published_at"));
}

#[test]
fn run_returns_normalized_payload_on_success() {
    let mut input = Map::new();
    input.insert("name".into(), json!("  Widget  "));
    input.insert("is_active".into(), json!("yes"));

    let payload = run(input, &name_required()).expect("valid payload");
    assert_eq!(payload.get("name"), Some(&json!("Widget")));
    assert_eq!(payload.get("is_active"), Some(&json!(true)));
}
