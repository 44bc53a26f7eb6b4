//! Contradiction detection within AND-groups
//!
//! Conditions are grouped left to right: every `OR` starts a new group and
//! `AND` extends the current one. Each group must admit at least one value
//! for every variable it constrains. Groups are never compared with each
//! other since they are alternatives.

use super::domain::{NumericDomain, TextDomain};
use crate::evaluator::evaluate;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Comparator, Condition, Connector, LiteralType, Operand};
use crate::{RuleError, RuleResult};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace};

/// Literal side of a collapsible condition
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ConstraintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintValue::Number(n) => write!(f, "{}", n),
            ConstraintValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A condition reduced to `variable <comparator> value`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub variable: String,
    pub comparator: Comparator,
    pub value: ConstraintValue,
}

impl Constraint {
    /// Reduce a condition, folding `NOT` into the comparator and moving the
    /// variable to the left.
    ///
    /// Returns `None` for conditions that cannot narrow a single variable:
    /// variable against variable, literal against literal, dates and times,
    /// and numeric literals that still reference variables.
    pub fn from_condition(condition: &Condition, limits: &ResourceLimits) -> Option<Self> {
        let comparator = if condition.negated {
            condition.comparator.negate()
        } else {
            condition.comparator
        };

        let (variable, comparator, value, value_type) = match (&condition.left, &condition.right) {
            (Operand::Variable { key }, Operand::Literal { value, value_type }) => {
                (key, comparator, value, value_type)
            }
            (Operand::Literal { value, value_type }, Operand::Variable { key }) => {
                (key, comparator.flip(), value, value_type)
            }
            _ => return None,
        };

        let value = match value_type {
            LiteralType::Number => ConstraintValue::Number(constant_number(value, limits)?),
            LiteralType::Text => ConstraintValue::Text(value.clone()),
            LiteralType::Date | LiteralType::Time | LiteralType::DateTime => return None,
        };

        Some(Constraint {
            variable: variable.clone(),
            comparator,
            value,
        })
    }

    /// `variable|comparator|value`, identical for conditions that constrain
    /// the same way however they were written.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}",
            self.variable,
            self.comparator.symbol(),
            self.value
        )
    }
}

/// Value of a numeric literal that does not depend on any variable
fn constant_number(text: &str, limits: &ResourceLimits) -> Option<f64> {
    match text.parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) => evaluate(text, &HashMap::new(), limits).ok(),
    }
}

/// Partition conditions into AND-groups; a new group starts at every `OR`
pub fn and_groups(conditions: &[Condition]) -> Vec<&[Condition]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (index, condition) in conditions.iter().enumerate() {
        if index > start && condition.connector == Some(Connector::Or) {
            groups.push(&conditions[start..index]);
            start = index;
        }
    }
    if start < conditions.len() {
        groups.push(&conditions[start..]);
    }
    groups
}

/// Reject duplicate or contradictory constraints within any AND-group
pub fn detect_collisions(conditions: &[Condition], limits: &ResourceLimits) -> RuleResult<()> {
    let groups = and_groups(conditions);
    debug!(
        conditions = conditions.len(),
        groups = groups.len(),
        "checking condition groups"
    );
    for group in groups {
        check_group(group, limits)?;
    }
    Ok(())
}

fn check_group(group: &[Condition], limits: &ResourceLimits) -> RuleResult<()> {
    let mut fingerprints = HashSet::new();
    let mut numbers: HashMap<String, NumericDomain> = HashMap::new();
    let mut texts: HashMap<String, TextDomain> = HashMap::new();

    for constraint in group
        .iter()
        .filter_map(|c| Constraint::from_condition(c, limits))
    {
        let fingerprint = constraint.fingerprint();
        trace!(%fingerprint, "applying constraint");
        if !fingerprints.insert(fingerprint.clone()) {
            return Err(RuleError::DuplicateCondition(fingerprint));
        }

        let satisfiable = match &constraint.value {
            ConstraintValue::Number(value) => numbers
                .entry(constraint.variable.clone())
                .or_default()
                .apply(constraint.comparator, *value),
            ConstraintValue::Text(value) => texts
                .entry(constraint.variable.clone())
                .or_default()
                .apply(constraint.comparator, value),
        };
        if !satisfiable {
            return Err(RuleError::ConflictingConditions(constraint.variable));
        }
    }
    Ok(())
}
