//! Arithmetic evaluation
//!
//! Walks the pest tree produced by `parser::parse_arithmetic` and computes
//! an `f64` against a key to value map. Every intermediate result must be
//! finite.

use crate::ast::DepthGuard;
use crate::parser::{parse_arithmetic, Rule};
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Variable, VariableType};
use crate::{RuleError, RuleResult};
use pest::iterators::{Pair, Pairs};
use std::collections::HashMap;

/// Evaluate an arithmetic expression.
///
/// ```text
/// 2 + 3 * 4            = 14
/// (2 + 3) * 4          = 20
/// -booking_hours * 10  with booking_hours = 3 gives -30
/// ```
pub fn evaluate(
    expression: &str,
    variables: &HashMap<String, f64>,
    limits: &ResourceLimits,
) -> RuleResult<f64> {
    let tree = parse_arithmetic(expression, limits)?;
    let mut evaluator = Evaluator {
        variables,
        depth: DepthGuard::new(limits.max_expression_depth),
    };
    let value = evaluator.binary_chain(tree.into_inner(), Evaluator::term)?;
    if !value.is_finite() {
        return Err(RuleError::InvalidNumber(format!("{} is not finite", value)));
    }
    Ok(value)
}

/// Every declared number variable mapped to zero.
///
/// Formulas are checked for structural well-formedness at authoring time by
/// evaluating them against this map.
pub fn zero_filled(variables: &[Variable]) -> HashMap<String, f64> {
    variables
        .iter()
        .filter(|v| v.variable_type == VariableType::Number)
        .map(|v| (v.key.clone(), 0.0))
        .collect()
}

struct Evaluator<'a> {
    variables: &'a HashMap<String, f64>,
    depth: DepthGuard,
}

impl Evaluator<'_> {
    /// A parenthesised sub-expression, one level deeper than its parent
    fn nested(&mut self, pair: Pair<Rule>) -> RuleResult<f64> {
        self.depth.push()?;
        let result = self.binary_chain(pair.into_inner(), Self::term);
        self.depth.pop();
        result
    }

    fn term(&mut self, pair: Pair<Rule>) -> RuleResult<f64> {
        self.binary_chain(pair.into_inner(), Self::factor)
    }

    /// `operand (operator operand)*`, folded left to right
    fn binary_chain(
        &mut self,
        mut pairs: Pairs<Rule>,
        operand: fn(&mut Self, Pair<Rule>) -> RuleResult<f64>,
    ) -> RuleResult<f64> {
        let first = next_pair(&mut pairs)?;
        let mut value = operand(self, first)?;
        while let Some(operator) = pairs.next() {
            let rhs = operand(self, next_pair(&mut pairs)?)?;
            value = apply(operator.as_str(), value, rhs)?;
        }
        Ok(value)
    }

    fn factor(&mut self, pair: Pair<Rule>) -> RuleResult<f64> {
        let mut inner = pair.into_inner();
        let first = next_pair(&mut inner)?;
        match first.as_rule() {
            Rule::sign => {
                let operand = next_pair(&mut inner)?;
                self.depth.push()?;
                let value = self.factor(operand);
                self.depth.pop();
                let value = value?;
                Ok(if first.as_str() == "-" { -value } else { value })
            }
            Rule::expression => self.nested(first),
            Rule::number => parse_number(first.as_str()),
            Rule::identifier => {
                let key = first.as_str();
                match self.variables.get(key) {
                    Some(value) if value.is_finite() => Ok(*value),
                    Some(_) => Err(RuleError::InvalidNumber(key.to_string())),
                    None => Err(RuleError::UnknownVariable(key.to_string())),
                }
            }
            _ => Err(RuleError::UnexpectedCharacter {
                found: first.as_str().to_string(),
                position: first.as_span().start(),
            }),
        }
    }
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>) -> RuleResult<Pair<'i, Rule>> {
    pairs.next().ok_or(RuleError::EmptyExpression)
}

fn parse_number(text: &str) -> RuleResult<f64> {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(RuleError::InvalidNumber(text.to_string())),
    }
}

fn apply(operator: &str, lhs: f64, rhs: f64) -> RuleResult<f64> {
    let result = match operator {
        "+" => lhs + rhs,
        "-" => lhs - rhs,
        "*" => lhs * rhs,
        "/" => {
            if rhs == 0.0 {
                return Err(RuleError::DivisionByZero);
            }
            lhs / rhs
        }
        other => {
            return Err(RuleError::UnexpectedCharacter {
                found: other.to_string(),
                position: 0,
            })
        }
    };
    if !result.is_finite() {
        return Err(RuleError::InvalidNumber(format!(
            "{} {} {} is not finite",
            lhs, operator, rhs
        )));
    }
    Ok(result)
}
