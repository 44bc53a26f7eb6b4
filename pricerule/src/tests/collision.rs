use super::test_variables;
use crate::analysis::collision::{and_groups, detect_collisions, Constraint, ConstraintValue};
use crate::analysis::domain::{bounds_contradict, Bound, NumericDomain, TextDomain};
use crate::ast::ConditionIdGenerator;
use crate::parser::conditions::parse_conditions;
use crate::{Comparator, Condition, ResourceLimits, RuleError, RuleResult};

fn conditions(text: &str) -> Vec<Condition> {
    let mut id_gen = ConditionIdGenerator::new();
    parse_conditions(text, &test_variables(), &mut id_gen, &ResourceLimits::default())
        .expect("conditions should parse")
}

fn check(text: &str) -> RuleResult<()> {
    detect_collisions(&conditions(text), &ResourceLimits::default())
}

#[test]
fn test_contradiction_in_and_group() {
    assert_eq!(
        check("booking_hours > 10 AND booking_hours < 5"),
        Err(RuleError::ConflictingConditions("booking_hours".to_string()))
    );
}

#[test]
fn test_or_separates_groups() {
    assert!(check("booking_hours > 10 OR booking_hours < 5").is_ok());
}

#[test]
fn test_grouping_is_left_to_right() {
    // (a AND b) OR (c AND d): the contradiction sits in the second group
    assert!(check("rate > 1 AND rate < 5 OR rate > 10 AND rate < 20").is_ok());
    assert!(check("rate > 1 AND rate < 5 OR rate > 10 AND rate < 2").is_err());
}

#[test]
fn test_and_groups() {
    let list = conditions("rate > 1 AND rate < 5 OR rate > 10 AND rate < 20 OR rate = 7");
    let sizes: Vec<usize> = and_groups(&list).iter().map(|g| g.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(and_groups(&[]).is_empty());
}

#[test]
fn test_touching_bounds() {
    assert!(check("rate >= 5 AND rate <= 5").is_ok());
    assert!(check("rate > 5 AND rate <= 5").is_err());
    assert!(check("rate >= 5 AND rate < 5").is_err());
}

#[test]
fn test_equality_against_bounds() {
    assert!(check("rate > 1 AND rate = 3").is_ok());
    assert!(check("rate > 3 AND rate = 3").is_err());
    assert!(check("rate = 3 AND rate < 3").is_err());
    assert!(check("rate = 3 AND rate = 4").is_err());
}

#[test]
fn test_exclusions() {
    assert!(check("rate = 5 AND rate != 5").is_err());
    assert!(check("rate != 5 AND rate = 5").is_err());
    assert!(check("rate != 5 AND rate != 6").is_ok());
    assert!(check("rate >= 5 AND rate <= 5 AND rate != 5").is_err());
}

#[test]
fn test_negation_is_normalized() {
    // NOT rate > 4 is rate <= 4
    assert!(check("NOT rate > 4 AND rate > 4").is_err());
    assert!(check("NOT rate = 4 AND rate = 4").is_err());
}

#[test]
fn test_literal_on_left_is_flipped() {
    assert!(check("10 < rate AND rate < 5").is_err());
    assert_eq!(
        check("4 < rate AND rate > 4"),
        Err(RuleError::DuplicateCondition("rate|>|4".to_string()))
    );
}

#[test]
fn test_duplicate_fingerprint_ignores_formatting() {
    assert_eq!(
        check("rate > 4 AND rate > 4.0"),
        Err(RuleError::DuplicateCondition("rate|>|4".to_string()))
    );
    assert!(check("rate > 4 OR rate > 4").is_ok());
}

#[test]
fn test_constant_expressions_collapse() {
    assert!(check("rate > 2 * 3 AND rate < 5").is_err());
    // Literals that depend on variables are not collapsible
    assert!(check("rate > booking_hours * 3 AND rate < 5").is_ok());
}

#[test]
fn test_float_exclusions_are_exact() {
    // 0.1 + 0.2 is not exactly 0.3, so this is not reported
    assert!(check("rate = 0.3 AND rate != 0.1 + 0.2").is_ok());
}

#[test]
fn test_text_constraints() {
    assert!(check("city = 'A' AND city = 'B'").is_err());
    assert!(check("city = 'A' AND city != 'A'").is_err());
    assert!(check("city != 'A' AND city != 'B'").is_ok());
    assert!(check("city = 'A' OR city = 'B'").is_ok());
    assert_eq!(
        check("city = 'A' AND city = 'A'"),
        Err(RuleError::DuplicateCondition("city|=|A".to_string()))
    );
}

#[test]
fn test_skipped_conditions() {
    assert!(check("rate > booking_hours AND rate < booking_hours").is_ok());
    assert!(check(
        "booking_date > date('2024-02-01') AND booking_date < date('2024-01-01')"
    )
    .is_ok());
}

#[test]
fn test_constraint_from_condition() {
    let list = conditions("NOT 5 <= rate");
    let constraint = Constraint::from_condition(&list[0], &ResourceLimits::default()).unwrap();
    // NOT (5 <= rate) is 5 > rate, flipped to rate < 5
    assert_eq!(constraint.variable, "rate");
    assert_eq!(constraint.comparator, Comparator::LessThan);
    assert_eq!(constraint.value, ConstraintValue::Number(5.0));
    assert_eq!(constraint.fingerprint(), "rate|<|5");
}

#[test]
fn test_numeric_domain() {
    let mut domain = NumericDomain::new();
    assert!(domain.apply(Comparator::GreaterThan, 1.0));
    assert!(domain.apply(Comparator::GreaterThanOrEqual, 1.0));
    assert_eq!(domain.lower, Some(Bound::exclusive(1.0)));
    assert!(domain.apply(Comparator::LessThan, 10.0));
    assert!(domain.apply(Comparator::LessThan, 20.0));
    assert_eq!(domain.upper, Some(Bound::exclusive(10.0)));
    assert!(!domain.apply(Comparator::Equal, 10.0));
}

#[test]
fn test_bounds_contradict() {
    assert!(!bounds_contradict(&Bound::inclusive(1.0), &Bound::inclusive(1.0)));
    assert!(bounds_contradict(&Bound::inclusive(1.0), &Bound::exclusive(1.0)));
    assert!(bounds_contradict(&Bound::inclusive(2.0), &Bound::inclusive(1.0)));
    assert!(!bounds_contradict(&Bound::exclusive(1.0), &Bound::exclusive(2.0)));
}

#[test]
fn test_text_domain_ignores_ordering() {
    let mut domain = TextDomain::new();
    assert!(domain.apply(Comparator::GreaterThan, "b"));
    assert!(domain.apply(Comparator::LessThan, "a"));
    assert!(domain.apply(Comparator::Equal, "c"));
}
