use crate::analysis::{detect_collisions, detect_duplicate_clauses};
use crate::ast::ConditionIdGenerator;
use crate::parser::conditions::{self, ConditionText};
use crate::parser::{self, operands, ParsedClause};
use crate::semantic::{Clause, Condition, Connector, Definition, Operand, Variable};
use crate::serializers;
use crate::{evaluator, ResourceLimits, RuleResult, Validator};
use std::collections::HashMap;
use tracing::debug;

/// The pricing rule engine.
///
/// Holds no state besides its limits; every operation is a pure function of
/// its arguments, so one engine can serve any number of callers.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    limits: ResourceLimits,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom resource limits
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self { limits }
    }

    /// Get the current resource limits
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Evaluate an arithmetic expression against number values
    pub fn evaluate(&self, expression: &str, variables: &HashMap<String, f64>) -> RuleResult<f64> {
        evaluator::evaluate(expression, variables, &self.limits)
    }

    pub fn split_conditions<'a>(&self, text: &'a str) -> RuleResult<Vec<ConditionText<'a>>> {
        self.limits.check_text_size(text)?;
        conditions::split_conditions(text)
    }

    pub fn parse_operand(&self, token: &str, variables: &[Variable]) -> RuleResult<Operand> {
        self.limits.check_text_size(token)?;
        operands::parse_operand(token, variables, &self.limits)
    }

    /// Parse a condition list such as `booking_hours > 4 AND city = 'Manila'`
    pub fn parse_conditions(&self, text: &str, variables: &[Variable]) -> RuleResult<Vec<Condition>> {
        let mut id_gen = ConditionIdGenerator::new();
        conditions::parse_conditions(text, variables, &mut id_gen, &self.limits)
    }

    /// Check every AND-group of a condition list for repeats and contradictions
    pub fn detect_collisions(&self, conditions: &[Condition]) -> RuleResult<()> {
        detect_collisions(conditions, &self.limits)
    }

    pub fn parse_rule(&self, text: &str, variables: &[Variable]) -> RuleResult<Vec<ParsedClause>> {
        parser::parse_rule(text, variables, &self.limits)
    }

    /// Run the full pipeline over rule text and return the resulting
    /// definition.
    ///
    /// `definition` is only read: on error the caller still holds the last
    /// accepted definition unchanged.
    pub fn apply_expression(&self, definition: &Definition, text: &str) -> RuleResult<Definition> {
        let parsed = parser::parse_rule(text, &definition.variables, &self.limits)?;

        for clause in &parsed {
            detect_collisions(&clause.conditions, &self.limits)?;
        }
        detect_duplicate_clauses(
            parsed.iter().map(|clause| clause.conditions.as_slice()),
            &self.limits,
        )?;

        let mut clauses = parsed.into_iter();
        let mut updated = Definition {
            variables: definition.variables.clone(),
            ..Definition::default()
        };
        if let Some(first) = clauses.next() {
            updated.formula = first.formula();
            updated.conditions = first.conditions;
        }
        updated.additional_clauses = clauses
            .map(|clause| Clause {
                formula: clause.formula(),
                connector: clause.connector.unwrap_or(Connector::And),
                conditions: clause.conditions,
            })
            .collect();

        debug!(
            clauses = updated.clause_count(),
            conditions = updated.conditions.len(),
            "applied rule expression"
        );
        Ok(updated)
    }

    /// Canonical rule text of a definition
    pub fn serialize(&self, definition: &Definition) -> String {
        serializers::serialize(definition)
    }

    pub fn validate_definition(&self, definition: &Definition) -> RuleResult<()> {
        Validator::new().validate_definition(definition, &self.limits)
    }

    pub fn to_json(&self, definition: &Definition) -> RuleResult<String> {
        serializers::to_json(definition)
    }

    pub fn from_json(&self, json: &str) -> RuleResult<Definition> {
        serializers::from_json(json, &self.limits)
    }
}
