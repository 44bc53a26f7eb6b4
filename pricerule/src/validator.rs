use crate::evaluator::{evaluate, zero_filled};
use crate::parser::{literals, split_formula};
use crate::resource_limits::ResourceLimits;
use crate::semantic::{
    Condition, Definition, LiteralType, Operand, Variable, VariableType, KEYWORDS,
    RESERVED_VARIABLES,
};
use crate::{RuleError, RuleResult};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Whether a variable of `variable_type` may be compared with a literal of
/// `literal_type`.
pub fn is_compatible(variable_type: VariableType, literal_type: LiteralType) -> bool {
    matches!(
        (variable_type, literal_type),
        (VariableType::Number, LiteralType::Number)
            | (VariableType::Text, LiteralType::Text)
            | (VariableType::Date, LiteralType::Date | LiteralType::DateTime)
            | (VariableType::Time, LiteralType::Time)
    )
}

fn literals_compatible(left: LiteralType, right: LiteralType) -> bool {
    use LiteralType::*;
    left == right || matches!((left, right), (Date, DateTime) | (DateTime, Date))
}

fn lookup<'a>(variables: &'a [Variable], key: &str) -> RuleResult<&'a Variable> {
    variables
        .iter()
        .find(|v| v.key == key)
        .ok_or_else(|| RuleError::UnknownVariable(key.to_string()))
}

/// Check that the two sides of a comparison have compatible types.
///
/// Mismatches name the variable involved so the form can highlight it.
pub fn check_types(left: &Operand, right: &Operand, variables: &[Variable]) -> RuleResult<()> {
    match (left, right) {
        (Operand::Variable { key: left_key }, Operand::Variable { key: right_key }) => {
            let left_var = lookup(variables, left_key)?;
            let right_var = lookup(variables, right_key)?;
            if left_var.variable_type != right_var.variable_type {
                return Err(RuleError::TypeMismatch {
                    variable: left_var.key.clone(),
                    expected: left_var.variable_type.name().to_string(),
                    actual: right_var.variable_type.name().to_string(),
                });
            }
            Ok(())
        }
        (Operand::Variable { key }, Operand::Literal { value_type, .. })
        | (Operand::Literal { value_type, .. }, Operand::Variable { key }) => {
            let variable = lookup(variables, key)?;
            if !is_compatible(variable.variable_type, *value_type) {
                return Err(RuleError::TypeMismatch {
                    variable: variable.key.clone(),
                    expected: variable.variable_type.name().to_string(),
                    actual: value_type.name().to_string(),
                });
            }
            Ok(())
        }
        (
            Operand::Literal {
                value_type: left_type,
                ..
            },
            Operand::Literal {
                value_type: right_type,
                ..
            },
        ) => {
            if !literals_compatible(*left_type, *right_type) {
                return Err(RuleError::IncompatibleLiterals {
                    left: left_type.name().to_string(),
                    right: right_type.name().to_string(),
                });
            }
            Ok(())
        }
    }
}

/// Check that a formula is well formed by evaluating it with every number
/// variable set to zero.
///
/// A formula naming a declared variable of another type reports a type
/// mismatch rather than an unknown variable.
pub fn validate_formula(
    formula: &str,
    variables: &[Variable],
    limits: &ResourceLimits,
) -> RuleResult<()> {
    match evaluate(formula, &zero_filled(variables), limits) {
        Ok(_) => Ok(()),
        Err(RuleError::UnknownVariable(key)) => match variables.iter().find(|v| v.key == key) {
            Some(variable) => Err(RuleError::TypeMismatch {
                variable: key,
                expected: VariableType::Number.name().to_string(),
                actual: variable.variable_type.name().to_string(),
            }),
            None => Err(RuleError::UnknownVariable(key)),
        },
        Err(e) => Err(e),
    }
}

fn key_regex() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("key pattern is valid"))
}

/// Validate a single variable declaration
pub fn validate_variable(variable: &Variable) -> RuleResult<()> {
    let invalid = |reason: &str| RuleError::InvalidVariable {
        key: variable.key.clone(),
        reason: reason.to_string(),
    };

    if !key_regex().is_match(&variable.key) {
        return Err(invalid(
            "keys must be snake_case: lowercase letters, digits and underscores",
        ));
    }
    if KEYWORDS.contains(&variable.key.as_str()) {
        return Err(invalid("keys cannot be a keyword of the rule language"));
    }
    if variable.label.trim().is_empty() {
        return Err(invalid("label cannot be empty"));
    }
    if variable.user_input == Some(true) && !variable.variable_type.allows_user_input() {
        return Err(invalid("only number and text variables can be user input"));
    }
    if let Some(initial) = &variable.initial_value {
        validate_initial_value(variable, initial)?;
    }
    Ok(())
}

fn validate_initial_value(variable: &Variable, value: &serde_json::Value) -> RuleResult<()> {
    use serde_json::Value;
    let mismatch = |actual: &str| RuleError::TypeMismatch {
        variable: variable.key.clone(),
        expected: variable.variable_type.name().to_string(),
        actual: actual.to_string(),
    };

    match (variable.variable_type, value) {
        (_, Value::Null) => Ok(()),
        (VariableType::Number, Value::Number(_)) => Ok(()),
        (VariableType::Number, Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(()),
            _ => Err(RuleError::InvalidNumber(s.clone())),
        },
        (VariableType::Text, Value::String(_)) => Ok(()),
        (VariableType::Date, Value::String(s)) => literals::parse_date(s).map(|_| ()),
        (VariableType::Time, Value::String(s)) => literals::parse_time(s, None).map(|_| ()),
        (_, Value::Bool(_)) => Err(mismatch("boolean")),
        (_, Value::Number(_)) => Err(mismatch("number")),
        (_, Value::Array(_)) => Err(mismatch("array")),
        (_, Value::Object(_)) => Err(mismatch("object")),
    }
}

/// Semantic validator for definitions that did not come straight out of the
/// parser, e.g. ones loaded from storage.
#[derive(Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate every structural invariant of a definition
    pub fn validate_definition(
        &self,
        definition: &Definition,
        limits: &ResourceLimits,
    ) -> RuleResult<()> {
        // Phase 1: variable declarations
        self.validate_variables(&definition.variables)?;

        // Phase 2: condition lists of every clause
        self.validate_conditions(&definition.conditions, &definition.variables, limits)?;
        for clause in &definition.additional_clauses {
            if clause.conditions.is_empty() {
                return Err(RuleError::InvalidDefinition(format!(
                    "clause joined with {} has no conditions",
                    clause.connector
                )));
            }
            self.validate_conditions(&clause.conditions, &definition.variables, limits)?;
        }
        limits.check_clause_count(definition.clause_count())?;

        // Phase 3: formulas. A definition nobody has authored yet has none.
        let untouched = definition.formula.trim().is_empty()
            && definition.conditions.is_empty()
            && definition.additional_clauses.is_empty();
        if untouched {
            return Ok(());
        }
        let formulas = std::iter::once(definition.formula.as_str())
            .chain(definition.additional_clauses.iter().map(|c| c.formula.as_str()));
        for formula in formulas {
            self.validate_stored_formula(formula, &definition.variables, limits)?;
        }

        // Bare formulas have no IF to pair an ELSE with
        if definition.conditions.is_empty() && split_formula(&definition.formula).1.is_some() {
            return Err(RuleError::InvalidDefinition("ELSE without IF".to_string()));
        }

        Ok(())
    }

    fn validate_variables(&self, variables: &[Variable]) -> RuleResult<()> {
        let mut seen = HashSet::new();
        for variable in variables {
            if !seen.insert(variable.key.as_str()) {
                return Err(RuleError::DuplicateVariable(variable.key.clone()));
            }
            validate_variable(variable)?;
        }

        for (key, _, variable_type) in RESERVED_VARIABLES {
            match variables.iter().find(|v| v.key == *key) {
                None => {
                    return Err(RuleError::InvalidVariable {
                        key: key.to_string(),
                        reason: "reserved variable is missing".to_string(),
                    })
                }
                Some(v) if v.variable_type != *variable_type => {
                    return Err(RuleError::InvalidVariable {
                        key: key.to_string(),
                        reason: format!("reserved variable must be a {}", variable_type.name()),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn validate_conditions(
        &self,
        conditions: &[Condition],
        variables: &[Variable],
        limits: &ResourceLimits,
    ) -> RuleResult<()> {
        limits.check_condition_count(conditions.len())?;
        let mut ids = HashSet::new();

        for (index, condition) in conditions.iter().enumerate() {
            if !ids.insert(&condition.id) {
                return Err(RuleError::InvalidDefinition(format!(
                    "condition id '{}' is used twice",
                    condition.id
                )));
            }
            match (index, condition.connector) {
                (0, Some(connector)) => {
                    return Err(RuleError::InvalidDefinition(format!(
                        "the first condition cannot start with {}",
                        connector
                    )))
                }
                (i, None) if i > 0 => {
                    return Err(RuleError::InvalidDefinition(format!(
                        "condition '{}' has no connector",
                        condition.id
                    )))
                }
                _ => {}
            }
            for operand in [&condition.left, &condition.right] {
                self.validate_operand(operand, variables, limits)?;
            }
            check_types(&condition.left, &condition.right, variables)?;
        }
        Ok(())
    }

    fn validate_operand(
        &self,
        operand: &Operand,
        variables: &[Variable],
        limits: &ResourceLimits,
    ) -> RuleResult<()> {
        match operand {
            Operand::Variable { key } => lookup(variables, key).map(|_| ()),
            Operand::Literal { value, value_type } => match value_type {
                LiteralType::Number => validate_formula(value, variables, limits),
                // No quoting style can hold both quote characters
                LiteralType::Text if value.contains('\'') && value.contains('"') => {
                    Err(RuleError::InvalidDefinition(format!(
                        "text literal {} contains both quote characters",
                        value
                    )))
                }
                LiteralType::Text => Ok(()),
                LiteralType::Date => literals::parse_date(value).map(|_| ()),
                LiteralType::Time => {
                    let normalized = literals::parse_time(value, None)?;
                    if normalized != *value {
                        return Err(RuleError::InvalidTime(value.clone()));
                    }
                    Ok(())
                }
                LiteralType::DateTime => literals::parse_datetime(value).map(|_| ()),
            },
        }
    }

    fn validate_stored_formula(
        &self,
        formula: &str,
        variables: &[Variable],
        limits: &ResourceLimits,
    ) -> RuleResult<()> {
        let (then_formula, else_formula) = split_formula(formula);
        if then_formula.is_empty() {
            return Err(RuleError::MissingFormula("THEN".to_string()));
        }
        validate_formula(then_formula, variables, limits)?;
        if let Some(otherwise) = else_formula {
            if otherwise.is_empty() {
                return Err(RuleError::MissingFormula("ELSE".to_string()));
            }
            validate_formula(otherwise, variables, limits)?;
        }
        Ok(())
    }
}
