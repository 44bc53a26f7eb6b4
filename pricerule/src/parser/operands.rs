//! Operand classification
//!
//! A token on either side of a comparator is tried, in order, as a number,
//! a quoted text, a typed function literal, an arithmetic sub-expression
//! and finally a bare variable reference.

use super::literals::parse_function_literal;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Operand, Variable};
use crate::{RuleError, RuleResult};
use regex::Regex;
use std::sync::OnceLock;

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("number pattern is valid"))
}

fn function_regex() -> &'static Regex {
    static FUNCTION: OnceLock<Regex> = OnceLock::new();
    FUNCTION.get_or_init(|| {
        Regex::new(r"(?s)^([A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)$").expect("function pattern is valid")
    })
}

pub fn parse_operand(
    token: &str,
    variables: &[Variable],
    limits: &ResourceLimits,
) -> RuleResult<Operand> {
    let token = token.trim();
    if token.is_empty() {
        return Err(RuleError::MissingOperand("in condition".to_string()));
    }

    if number_regex().is_match(token) {
        return parse_number_literal(token);
    }

    if let Some(text) = parse_quoted(token)? {
        return Ok(Operand::text(text));
    }

    if let Some(captures) = function_regex().captures(token) {
        let name = &captures[1];
        let arguments = &captures[2];
        return parse_function_literal(name, arguments);
    }

    if is_arithmetic(token) {
        crate::validator::validate_formula(token, variables, limits)?;
        return Ok(Operand::number(token));
    }

    if variables.iter().any(|v| v.key == token) {
        return Ok(Operand::variable(token));
    }

    Err(RuleError::UnrecognizedReference(token.to_string()))
}

fn parse_number_literal(token: &str) -> RuleResult<Operand> {
    match token.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Operand::number(token)),
        _ => Err(RuleError::InvalidNumber(token.to_string())),
    }
}

/// Unquote `'...'` or `"..."`. Nothing inside is unescaped.
///
/// Returns `Ok(None)` when the token is not a single quoted literal.
fn parse_quoted(token: &str) -> RuleResult<Option<&str>> {
    let Some(open) = token.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return Ok(None);
    };
    let inner = &token[1..];
    match inner.find(open) {
        None => Err(RuleError::UnterminatedLiteral { position: 0 }),
        Some(close) if close + 1 == inner.len() => Ok(Some(&inner[..close])),
        Some(_) => Ok(None),
    }
}

fn is_arithmetic(token: &str) -> bool {
    token.contains(['+', '-', '*', '/', '(', ')'])
}
