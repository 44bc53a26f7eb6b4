use super::test_definition;
use crate::{Connector, Engine, Operand, ResourceLimits, RuleError};
use std::collections::HashMap;

#[test]
fn test_apply_builds_new_definition() {
    let engine = Engine::new();
    let original = test_definition();
    let updated = engine
        .apply_expression(&original, "IF booking_hours >= 4 THEN booking_hours * 10")
        .unwrap();

    assert_eq!(updated.variables, original.variables);
    assert_eq!(updated.conditions.len(), 1);
    assert_eq!(updated.formula, "booking_hours * 10");
    assert!(updated.additional_clauses.is_empty());
    assert!(original.conditions.is_empty());
}

#[test]
fn test_apply_replaces_previous_conditions() {
    let engine = Engine::new();
    let first = engine
        .apply_expression(&test_definition(), "IF rate > 1 AND rate < 9 THEN 1")
        .unwrap();
    let second = engine.apply_expression(&first, "rate * 2").unwrap();
    assert!(second.conditions.is_empty());
    assert_eq!(second.formula, "rate * 2");
}

#[test]
fn test_apply_rejects_collisions() {
    let engine = Engine::new();
    let err = engine
        .apply_expression(
            &test_definition(),
            "IF booking_hours > 10 AND booking_hours < 5 THEN 1",
        )
        .unwrap_err();
    assert_eq!(
        err,
        RuleError::ConflictingConditions("booking_hours".to_string())
    );
}

#[test]
fn test_apply_checks_each_clause_separately() {
    let engine = Engine::new();
    let definition = engine
        .apply_expression(
            &test_definition(),
            "IF rate > 10 THEN 1 OR IF rate < 5 THEN 2",
        )
        .unwrap();
    assert_eq!(definition.additional_clauses.len(), 1);
    assert_eq!(definition.additional_clauses[0].connector, Connector::Or);
    assert_eq!(definition.additional_clauses[0].formula, "2");
}

#[test]
fn test_apply_rejects_duplicate_clauses() {
    let engine = Engine::new();
    let err = engine
        .apply_expression(
            &test_definition(),
            "IF booking_hours > 1 AND rate < 2 THEN rate OR IF rate < 2 AND booking_hours > 1 THEN booking_hours",
        )
        .unwrap_err();
    assert!(matches!(err, RuleError::DuplicateCondition(_)));
}

#[test]
fn test_evaluate() {
    let engine = Engine::new();
    let mut values = HashMap::new();
    values.insert("booking_hours".to_string(), 5.0);
    assert_eq!(engine.evaluate("booking_hours * 10 + 1", &values).unwrap(), 51.0);
}

#[test]
fn test_parse_operand() {
    let engine = Engine::new();
    let variables = test_definition().variables;
    assert_eq!(
        engine.parse_operand("rate", &variables).unwrap(),
        Operand::variable("rate")
    );
}

#[test]
fn test_parse_conditions_restarts_ids() {
    let engine = Engine::new();
    let variables = test_definition().variables;
    let first = engine.parse_conditions("rate > 1", &variables).unwrap();
    let second = engine.parse_conditions("rate > 2", &variables).unwrap();
    assert_eq!(first[0].id, second[0].id);
}

#[test]
fn test_custom_limits() {
    let engine = Engine::with_limits(ResourceLimits {
        max_expression_depth: 3,
        ..ResourceLimits::default()
    });
    assert_eq!(engine.limits().max_expression_depth, 3);
    assert!(matches!(
        engine.evaluate("((((1))))", &HashMap::new()),
        Err(RuleError::ResourceLimitExceeded { .. })
    ));
}

#[test]
fn test_validate_definition() {
    let engine = Engine::new();
    let definition = engine
        .apply_expression(&test_definition(), "IF city = 'Cebu' THEN rate ELSE rate * 2")
        .unwrap();
    assert!(engine.validate_definition(&definition).is_ok());

    let json = engine.to_json(&definition).unwrap();
    assert_eq!(engine.from_json(&json).unwrap(), definition);
}
