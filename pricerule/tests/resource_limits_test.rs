use pricerule::{Definition, Engine, ResourceLimits, RuleError};
use std::collections::HashMap;

fn limit_name(err: RuleError) -> String {
    match err {
        RuleError::ResourceLimitExceeded { limit_name, .. } => limit_name,
        other => panic!("expected a resource limit error, got {:?}", other),
    }
}

#[test]
fn deep_parentheses_fail_without_overflowing() {
    let engine = Engine::new();
    let depth = 10_000;
    let expression = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let err = engine.evaluate(&expression, &HashMap::new()).unwrap_err();
    assert_eq!(limit_name(err), "max_expression_depth");
}

#[test]
fn long_sign_runs_fail_without_overflowing() {
    let engine = Engine::new();
    let expression = format!("{}1", "-".repeat(5_000));
    let err = engine.evaluate(&expression, &HashMap::new()).unwrap_err();
    assert_eq!(limit_name(err), "max_expression_depth");
}

#[test]
fn nesting_at_the_limit_is_accepted() {
    let limits = ResourceLimits::default();
    let depth = limits.max_expression_depth;
    let expression = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let engine = Engine::with_limits(limits);
    assert_eq!(engine.evaluate(&expression, &HashMap::new()).unwrap(), 1.0);
}

#[test]
fn deep_nesting_inside_a_condition() {
    let engine = Engine::new();
    let operand = format!("{}booking_hours{}", "(".repeat(500), ")".repeat(500));
    let text = format!("IF booking_hours > {} THEN 1", operand);
    let err = engine
        .apply_expression(&Definition::with_reserved(), &text)
        .unwrap_err();
    assert_eq!(limit_name(err), "max_expression_depth");
}

#[test]
fn oversized_rule_text() {
    let engine = Engine::new();
    let text = format!("booking_hours{}", " + 1".repeat(5_000));
    let err = engine
        .apply_expression(&Definition::with_reserved(), &text)
        .unwrap_err();
    assert_eq!(limit_name(err), "max_rule_text_bytes");
}

#[test]
fn too_many_conditions() {
    let engine = Engine::new();
    let conditions: Vec<String> = (0..101).map(|i| format!("booking_hours != {}", i)).collect();
    let text = format!("IF {} THEN 1", conditions.join(" AND "));
    let err = engine
        .apply_expression(&Definition::with_reserved(), &text)
        .unwrap_err();
    assert_eq!(limit_name(err), "max_conditions");
}

#[test]
fn too_many_clauses() {
    let engine = Engine::new();
    let clauses: Vec<String> = (0..33)
        .map(|i| format!("IF booking_hours > {} THEN {}", i, i))
        .collect();
    let err = engine
        .apply_expression(&Definition::with_reserved(), &clauses.join(" OR "))
        .unwrap_err();
    assert_eq!(limit_name(err), "max_clauses");
}

#[test]
fn within_limits_is_accepted() {
    let engine = Engine::new();
    let conditions: Vec<String> = (0..100).map(|i| format!("booking_hours != {}", i)).collect();
    let text = format!("IF {} THEN 1", conditions.join(" AND "));
    let definition = engine
        .apply_expression(&Definition::with_reserved(), &text)
        .unwrap();
    assert_eq!(definition.conditions.len(), 100);
}
