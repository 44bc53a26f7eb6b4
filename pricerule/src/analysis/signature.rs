//! Clause signatures and duplicate clause detection
//!
//! Two IF clauses are duplicates when their conditions constrain the same
//! things, however the operands were ordered or the literals formatted.

use super::collision::Constraint;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Condition, Connector};
use crate::{RuleError, RuleResult};
use std::collections::HashMap;
use tracing::debug;

/// Signature of a single condition
///
/// Collapsible conditions use their constraint fingerprint. Anything else
/// (variable against variable, dates, expressions) uses the rendered
/// operands, ordered so that `a < b` and `b > a` agree.
pub fn condition_signature(condition: &Condition, limits: &ResourceLimits) -> String {
    if let Some(constraint) = Constraint::from_condition(condition, limits) {
        return constraint.fingerprint();
    }

    let comparator = if condition.negated {
        condition.comparator.negate()
    } else {
        condition.comparator
    };
    let left = condition.left.to_string();
    let right = condition.right.to_string();
    if right < left {
        format!("{}|{}|{}", right, comparator.flip().symbol(), left)
    } else {
        format!("{}|{}|{}", left, comparator.symbol(), right)
    }
}

/// Canonical signature of a clause's condition list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClauseSignature {
    /// Joined only by `AND`; order does not matter
    All(Vec<String>),
    /// Joined only by `OR`; order does not matter
    Any(Vec<String>),
    /// Mixed connectors; compared in order, connectors included
    Sequence(Vec<String>),
}

impl ClauseSignature {
    pub fn of(conditions: &[Condition], limits: &ResourceLimits) -> Self {
        let connectors: Vec<Connector> =
            conditions.iter().filter_map(|c| c.connector).collect();

        if connectors.iter().all(|c| *c == Connector::And) {
            ClauseSignature::All(sorted_signatures(conditions, limits))
        } else if connectors.iter().all(|c| *c == Connector::Or) {
            ClauseSignature::Any(sorted_signatures(conditions, limits))
        } else {
            let sequence = conditions
                .iter()
                .map(|c| match c.connector {
                    Some(connector) => {
                        format!("{} {}", connector.keyword(), condition_signature(c, limits))
                    }
                    None => condition_signature(c, limits),
                })
                .collect();
            ClauseSignature::Sequence(sequence)
        }
    }
}

fn sorted_signatures(conditions: &[Condition], limits: &ResourceLimits) -> Vec<String> {
    let mut signatures: Vec<String> = conditions
        .iter()
        .map(|c| condition_signature(c, limits))
        .collect();
    signatures.sort();
    signatures
}

/// Reject rule text in which two IF clauses carry the same conditions.
///
/// Clauses without conditions (bare formulas) are not compared. Clause
/// numbers in the error are 1-based positions in the input.
pub fn detect_duplicate_clauses<'a, I>(clauses: I, limits: &ResourceLimits) -> RuleResult<()>
where
    I: IntoIterator<Item = &'a [Condition]>,
{
    let mut seen: HashMap<ClauseSignature, usize> = HashMap::new();
    for (index, conditions) in clauses.into_iter().enumerate() {
        if conditions.is_empty() {
            continue;
        }
        let signature = ClauseSignature::of(conditions, limits);
        if let Some(first) = seen.get(&signature) {
            debug!(clause = index + 1, first = *first, "duplicate clause");
            return Err(RuleError::DuplicateCondition(format!(
                "clause {} repeats clause {}",
                index + 1,
                first
            )));
        }
        seen.insert(signature, index + 1);
    }
    Ok(())
}
