//! Condition splitting and parsing
//!
//! `booking_hours > 4 AND NOT city = 'Manila'` is split at top-level
//! connectors into clauses, and every clause is parsed into a `Condition`
//! with typed operands.

use super::operands::parse_operand;
use super::scan;
use crate::ast::ConditionIdGenerator;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Comparator, Condition, Connector, Variable};
use crate::{RuleError, RuleResult};
use tracing::trace;

/// Raw text of one condition and the connector preceding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionText<'a> {
    pub text: &'a str,
    pub connector: Option<Connector>,
}

/// Split condition text at top-level `AND`/`OR` connectors.
///
/// Connectors are matched case-insensitively and only as whole words
/// bounded by whitespace, so `brand = 'ORION'` or `order_total` never split.
pub fn split_conditions(text: &str) -> RuleResult<Vec<ConditionText<'_>>> {
    let connectors = scan::find_keywords(text, &["AND", "OR"])?;

    let mut parts = Vec::with_capacity(connectors.len() + 1);
    let mut start = 0;
    let mut connector = None;

    for found in &connectors {
        let part = text[start..found.start].trim();
        if part.is_empty() {
            return Err(RuleError::MissingOperand(format!(
                "before {}",
                found.keyword
            )));
        }
        parts.push(ConditionText {
            text: part,
            connector,
        });
        connector = Some(if found.keyword == "OR" {
            Connector::Or
        } else {
            Connector::And
        });
        start = found.end;
    }

    let last = text[start..].trim();
    if last.is_empty() {
        let context = match connector {
            Some(c) => format!("after {}", c.keyword()),
            None => "in condition".to_string(),
        };
        return Err(RuleError::MissingOperand(context));
    }
    parts.push(ConditionText {
        text: last,
        connector,
    });

    Ok(parts)
}

/// Split and parse a whole condition list
pub fn parse_conditions(
    text: &str,
    variables: &[Variable],
    id_gen: &mut ConditionIdGenerator,
    limits: &ResourceLimits,
) -> RuleResult<Vec<Condition>> {
    limits.check_text_size(text)?;
    let parts = split_conditions(text)?;
    limits.check_condition_count(parts.len())?;

    parts
        .into_iter()
        .map(|part| parse_condition(part.text, part.connector, variables, id_gen, limits))
        .collect()
}

/// Parse one condition: `[NOT] <operand> <comparator> <operand>`
pub fn parse_condition(
    text: &str,
    connector: Option<Connector>,
    variables: &[Variable],
    id_gen: &mut ConditionIdGenerator,
    limits: &ResourceLimits,
) -> RuleResult<Condition> {
    let (negated, body) = strip_not(text.trim());

    let (position, comparator) =
        find_comparator(body)?.ok_or_else(|| RuleError::MissingComparator(body.to_string()))?;

    let left_text = body[..position].trim();
    let right_text = body[position + comparator.symbol().len()..].trim();
    if left_text.is_empty() {
        return Err(RuleError::MissingOperand(format!(
            "before '{}'",
            comparator.symbol()
        )));
    }
    if right_text.is_empty() {
        return Err(RuleError::MissingOperand(format!(
            "after '{}'",
            comparator.symbol()
        )));
    }

    let left = parse_operand(left_text, variables, limits)?;
    let right = parse_operand(right_text, variables, limits)?;
    crate::validator::check_types(&left, &right, variables)?;

    let condition = Condition {
        id: id_gen.next_id(),
        connector,
        negated,
        comparator,
        left,
        right,
    };
    trace!(id = %condition.id, condition = %condition, "parsed condition");
    Ok(condition)
}

/// Strip a leading case-insensitive `NOT` followed by whitespace
fn strip_not(text: &str) -> (bool, &str) {
    let is_not = text
        .get(..3)
        .map(|word| word.eq_ignore_ascii_case("not"))
        .unwrap_or(false)
        && text[3..].starts_with(char::is_whitespace);
    if is_not {
        (true, text[3..].trim_start())
    } else {
        (false, text)
    }
}

/// Locate the first top-level comparator, preferring two-character symbols
/// at the same position.
fn find_comparator(text: &str) -> RuleResult<Option<(usize, Comparator)>> {
    let mask = scan::top_level_mask(text)?;
    for (index, _) in text.char_indices() {
        if !mask[index] {
            continue;
        }
        let rest = &text[index..];
        if let Some(comparator) = Comparator::BY_SYMBOL_LENGTH
            .iter()
            .find(|c| rest.starts_with(c.symbol()))
        {
            return Ok(Some((index, *comparator)));
        }
    }
    Ok(None)
}
