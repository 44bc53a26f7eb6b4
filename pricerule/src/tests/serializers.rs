use super::test_definition;
use crate::serializers::{from_json, serialize, serialize_conditions, to_json};
use crate::{Clause, Connector, Definition, Engine, ResourceLimits, RuleError};
use insta::assert_snapshot;

fn canonical(text: &str) -> String {
    let engine = Engine::new();
    let definition = engine
        .apply_expression(&test_definition(), text)
        .expect("rule should apply");
    serialize(&definition)
}

#[test]
fn test_canonical_if_then_else() {
    assert_snapshot!(
        canonical("if booking_hours>=4 and not city='Manila' then booking_hours*10 else booking_hours*8"),
        @"IF booking_hours >= 4 AND NOT city = 'Manila' THEN booking_hours*10 ELSE booking_hours*8"
    );
}

#[test]
fn test_canonical_function_literals() {
    assert_snapshot!(
        canonical("IF booking_date >= date( '2024-01-01' ) or booking_start_time < time('9:00', 'pm') THEN 5"),
        @"IF booking_date >= date('2024-01-01') OR booking_start_time < time('21:00') THEN 5"
    );
}

#[test]
fn test_canonical_text_quotes() {
    assert_snapshot!(
        canonical("IF city = \"O'Hare\" THEN rate"),
        @r#"IF city = "O'Hare" THEN rate"#
    );
}

#[test]
fn test_canonical_multi_clause() {
    assert_snapshot!(
        canonical("IF rate > 1 THEN 10 or if booking_days > 1 THEN 20 ELSE 30"),
        @"IF rate > 1 THEN 10 OR IF booking_days > 1 THEN 20 ELSE 30"
    );
}

#[test]
fn test_bare_formula() {
    let mut definition = test_definition();
    definition.formula = "booking_hours * rate".to_string();
    assert_eq!(serialize(&definition), "booking_hours * rate");
}

#[test]
fn test_conditions_only() {
    let engine = Engine::new();
    let conditions = engine
        .parse_conditions("rate > 1 or NOT city != 'x'", &test_definition().variables)
        .unwrap();
    assert_eq!(
        serialize_conditions(&conditions),
        "rate > 1 OR NOT city != 'x'"
    );
}

#[test]
fn test_additional_clause_connector() {
    let engine = Engine::new();
    let mut definition = engine
        .apply_expression(&test_definition(), "IF rate > 1 THEN 10")
        .unwrap();
    let extra = engine
        .parse_conditions("rate < 0", &definition.variables)
        .unwrap();
    definition.additional_clauses.push(Clause {
        connector: Connector::And,
        conditions: extra,
        formula: "0".to_string(),
    });
    assert_eq!(
        serialize(&definition),
        "IF rate > 1 THEN 10 AND IF rate < 0 THEN 0"
    );
}

#[test]
fn test_json_round_trip() {
    let engine = Engine::new();
    let definition = engine
        .apply_expression(
            &test_definition(),
            "IF booking_hours > 4 AND city = 'Manila' THEN rate * 2 ELSE rate",
        )
        .unwrap();
    let json = to_json(&definition).unwrap();
    let loaded = from_json(&json, &ResourceLimits::default()).unwrap();
    assert_eq!(loaded, definition);
}

#[test]
fn test_json_shape() {
    let engine = Engine::new();
    let definition = engine
        .apply_expression(&test_definition(), "IF rate >= 4 OR city != 'x' THEN 1")
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&to_json(&definition).unwrap()).unwrap();

    let first = &value["conditions"][0];
    assert_eq!(first["id"], "cond_1");
    assert_eq!(first["comparator"], ">=");
    assert!(first.get("connector").is_none());
    assert_eq!(first["left"]["kind"], "variable");
    assert_eq!(first["right"]["kind"], "literal");
    assert_eq!(first["right"]["valueType"], "number");

    let second = &value["conditions"][1];
    assert_eq!(second["connector"], "or");
    assert_eq!(second["comparator"], "!=");
    assert!(value.get("additionalClauses").is_none());
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        from_json("{ not json", &ResourceLimits::default()),
        Err(RuleError::Json(_))
    ));
}

fn stored_json(conditions: serde_json::Value, formula: &str) -> String {
    let mut value = serde_json::to_value(test_definition()).unwrap();
    value["conditions"] = conditions;
    value["formula"] = serde_json::Value::from(formula);
    value.to_string()
}

#[test]
fn test_json_is_validated() {
    let json = stored_json(
        serde_json::json!([{
            "id": "c1",
            "comparator": ">",
            "left": {"kind": "variable", "key": "price"},
            "right": {"kind": "literal", "value": "1", "valueType": "number"}
        }]),
        "rate",
    );
    assert_eq!(
        from_json(&json, &ResourceLimits::default()).unwrap_err(),
        RuleError::UnknownVariable("price".to_string())
    );
}

#[test]
fn test_json_without_reserved_variables() {
    let json = r#"{
        "variables": [{"key": "booking_hours", "label": "Hours", "type": "text"}],
        "conditions": [],
        "formula": ""
    }"#;
    assert!(matches!(
        from_json(json, &ResourceLimits::default()),
        Err(RuleError::InvalidVariable { ref key, .. }) if key == "booking_hours"
    ));
    assert_eq!(
        from_json(
            r#"{"variables": [], "conditions": [], "formula": ""}"#,
            &ResourceLimits::default()
        )
        .unwrap_err(),
        RuleError::InvalidVariable {
            key: "booking_hours".to_string(),
            reason: "reserved variable is missing".to_string(),
        }
    );
}

#[test]
fn test_json_rejects_definitions_without_canonical_text() {
    let limits = ResourceLimits::default();
    assert!(matches!(
        from_json(&stored_json(serde_json::json!([]), "5 ELSE 3"), &limits),
        Err(RuleError::InvalidDefinition(_))
    ));

    let mixed_quotes = stored_json(
        serde_json::json!([{
            "id": "c1",
            "comparator": "=",
            "left": {"kind": "variable", "key": "city"},
            "right": {"kind": "literal", "value": "it's \"x\"", "valueType": "text"}
        }]),
        "1",
    );
    assert!(matches!(
        from_json(&mixed_quotes, &limits),
        Err(RuleError::InvalidDefinition(_))
    ));
}

#[test]
fn test_quoted_text_round_trips() {
    let engine = Engine::new();
    for text in [r#"IF city = "O'Hare" THEN 1"#, r#"IF city = 'say "hi"' THEN 1"#] {
        let definition = engine.apply_expression(&test_definition(), text).unwrap();
        assert_eq!(serialize(&definition), text);
        let json = to_json(&definition).unwrap();
        assert_eq!(from_json(&json, &ResourceLimits::default()).unwrap(), definition);
    }
}

#[test]
fn test_json_size_limit() {
    let limits = ResourceLimits {
        max_definition_json_bytes: 16,
        ..ResourceLimits::default()
    };
    let json = to_json(&Definition::with_reserved()).unwrap();
    assert!(matches!(
        from_json(&json, &limits),
        Err(RuleError::ResourceLimitExceeded { .. })
    ));
}
