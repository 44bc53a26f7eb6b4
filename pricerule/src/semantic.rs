use crate::ast::ConditionId;
use crate::{RuleError, RuleResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Keys that every definition carries and that cannot be removed
pub const RESERVED_VARIABLES: &[(&str, &str, VariableType)] = &[
    ("booking_hours", "Booking hours", VariableType::Number),
    ("booking_days", "Booking days", VariableType::Number),
    ("guest_count", "Guest count", VariableType::Number),
    ("booking_date", "Booking date", VariableType::Date),
    ("booking_start_time", "Booking start time", VariableType::Time),
    ("booking_end_time", "Booking end time", VariableType::Time),
];

/// Words with a meaning in the rule language; never valid as variable keys
pub const KEYWORDS: &[&str] = &[
    "if", "then", "else", "and", "or", "not", "date", "time", "datetime",
];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_VARIABLES.iter().any(|(k, _, _)| *k == key)
}

/// Declared type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Number,
    Text,
    Date,
    Time,
}

impl VariableType {
    pub fn name(&self) -> &'static str {
        match self {
            VariableType::Number => "number",
            VariableType::Text => "text",
            VariableType::Date => "date",
            VariableType::Time => "time",
        }
    }

    /// Whether authors may mark variables of this type as user input
    pub fn allows_user_input(&self) -> bool {
        matches!(self, VariableType::Number | VariableType::Text)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Type tag carried by a literal operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralType {
    Number,
    Text,
    Date,
    Time,
    #[serde(rename = "datetime")]
    DateTime,
}

impl LiteralType {
    pub fn name(&self) -> &'static str {
        match self {
            LiteralType::Number => "number",
            LiteralType::Text => "text",
            LiteralType::Date => "date",
            LiteralType::Time => "time",
            LiteralType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A variable the author can reference in conditions and formulas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<bool>,
}

impl Variable {
    pub fn new(key: impl Into<String>, label: impl Into<String>, variable_type: VariableType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            variable_type,
            initial_value: None,
            user_input: None,
        }
    }

    pub fn with_initial_value(mut self, value: serde_json::Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn with_user_input(mut self, user_input: bool) -> Self {
        self.user_input = Some(user_input);
        self
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved_key(&self.key)
    }
}

/// A value reference in a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Operand {
    Variable {
        key: String,
    },
    Literal {
        value: String,
        #[serde(rename = "valueType")]
        value_type: LiteralType,
    },
}

impl Operand {
    pub fn variable(key: impl Into<String>) -> Self {
        Operand::Variable { key: key.into() }
    }

    pub fn literal(value: impl Into<String>, value_type: LiteralType) -> Self {
        Operand::Literal {
            value: value.into(),
            value_type,
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self::literal(value, LiteralType::Number)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::literal(value, LiteralType::Text)
    }

    pub fn variable_key(&self) -> Option<&str> {
        match self {
            Operand::Variable { key } => Some(key),
            Operand::Literal { .. } => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable { key } => write!(f, "{}", key),
            Operand::Literal { value, value_type } => match value_type {
                LiteralType::Number => write!(f, "{}", value),
                LiteralType::Text => write!(f, "{}", quote_text(value)),
                LiteralType::Date => write!(f, "date('{}')", value),
                LiteralType::Time => write!(f, "time('{}')", value),
                LiteralType::DateTime => write!(f, "datetime('{}')", value),
            },
        }
    }
}

/// Quote a text literal, falling back to double quotes when the text itself
/// contains a single quote.
fn quote_text(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", value)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Comparator {
    /// All comparators, two-character symbols first so scanning picks the
    /// longest match at a position.
    pub const BY_SYMBOL_LENGTH: [Comparator; 6] = [
        Comparator::LessThanOrEqual,
        Comparator::GreaterThanOrEqual,
        Comparator::NotEqual,
        Comparator::LessThan,
        Comparator::GreaterThan,
        Comparator::Equal,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::LessThan => "<",
            Comparator::LessThanOrEqual => "<=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterThanOrEqual => ">=",
            Comparator::Equal => "=",
            Comparator::NotEqual => "!=",
        }
    }

    /// Returns a human-readable name for the operator
    pub fn name(&self) -> &'static str {
        match self {
            Comparator::LessThan => "less than",
            Comparator::LessThanOrEqual => "less than or equal",
            Comparator::GreaterThan => "greater than",
            Comparator::GreaterThanOrEqual => "greater than or equal",
            Comparator::Equal => "equal",
            Comparator::NotEqual => "not equal",
        }
    }

    /// The comparator that holds exactly when this one does not
    pub fn negate(&self) -> Self {
        match self {
            Comparator::LessThan => Comparator::GreaterThanOrEqual,
            Comparator::LessThanOrEqual => Comparator::GreaterThan,
            Comparator::GreaterThan => Comparator::LessThanOrEqual,
            Comparator::GreaterThanOrEqual => Comparator::LessThan,
            Comparator::Equal => Comparator::NotEqual,
            Comparator::NotEqual => Comparator::Equal,
        }
    }

    /// The comparator to use after swapping the operands
    pub fn flip(&self) -> Self {
        match self {
            Comparator::LessThan => Comparator::GreaterThan,
            Comparator::LessThanOrEqual => Comparator::GreaterThanOrEqual,
            Comparator::GreaterThan => Comparator::LessThan,
            Comparator::GreaterThanOrEqual => Comparator::LessThanOrEqual,
            Comparator::Equal => Comparator::Equal,
            Comparator::NotEqual => Comparator::NotEqual,
        }
    }

    pub fn is_symmetric(&self) -> bool {
        matches!(self, Comparator::Equal | Comparator::NotEqual)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Joins a condition (or clause) to the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn keyword(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A single comparison in a condition list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: ConditionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<Connector>,
    #[serde(default)]
    pub negated: bool,
    pub comparator: Comparator,
    pub left: Operand,
    pub right: Operand,
}

impl Condition {
    /// Equality that ignores the condition id
    pub fn same_structure(&self, other: &Condition) -> bool {
        self.connector == other.connector
            && self.negated == other.negated
            && self.comparator == other.comparator
            && self.left == other.left
            && self.right == other.right
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT ")?;
        }
        write!(f, "{} {} {}", self.left, self.comparator, self.right)
    }
}

/// A further `IF ... THEN ... ELSE ...` unit joined to the previous one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub connector: Connector,
    pub conditions: Vec<Condition>,
    pub formula: String,
}

/// Variables, conditions and formula of a pricing rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub variables: Vec<Variable>,
    pub conditions: Vec<Condition>,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_clauses: Vec<Clause>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    /// A definition holding only the reserved variables
    pub fn with_reserved() -> Self {
        let variables = RESERVED_VARIABLES
            .iter()
            .map(|(key, label, variable_type)| Variable::new(*key, *label, *variable_type))
            .collect();
        Self {
            variables,
            ..Self::default()
        }
    }

    pub fn variable(&self, key: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.key == key)
    }

    /// Declare a new variable after validating it
    pub fn add_variable(&mut self, variable: Variable) -> RuleResult<()> {
        crate::validator::validate_variable(&variable)?;
        if self.variable(&variable.key).is_some() {
            return Err(RuleError::DuplicateVariable(variable.key));
        }
        self.variables.push(variable);
        Ok(())
    }

    /// Remove a variable that nothing references any more
    pub fn remove_variable(&mut self, key: &str) -> RuleResult<Variable> {
        if is_reserved_key(key) {
            return Err(RuleError::ReservedVariable(key.to_string()));
        }
        if self.referenced_keys().contains(key) {
            return Err(RuleError::VariableInUse(key.to_string()));
        }
        let index = self
            .variables
            .iter()
            .position(|v| v.key == key)
            .ok_or_else(|| RuleError::UnknownVariable(key.to_string()))?;
        Ok(self.variables.remove(index))
    }

    /// Every variable key used by a condition or formula of any clause
    pub fn referenced_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        let all_conditions = self
            .conditions
            .iter()
            .chain(self.additional_clauses.iter().flat_map(|c| c.conditions.iter()));
        for condition in all_conditions {
            for operand in [&condition.left, &condition.right] {
                match operand {
                    Operand::Variable { key } => {
                        keys.insert(key.clone());
                    }
                    Operand::Literal {
                        value,
                        value_type: LiteralType::Number,
                    } => keys.extend(crate::parser::scan::identifiers(value)),
                    Operand::Literal { .. } => {}
                }
            }
        }
        let formulas =
            std::iter::once(&self.formula).chain(self.additional_clauses.iter().map(|c| &c.formula));
        for formula in formulas {
            keys.extend(crate::parser::scan::identifiers(formula));
        }
        keys
    }

    pub fn clause_count(&self) -> usize {
        1 + self.additional_clauses.len()
    }
}

/// A named pricing rule as stored by the partner dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub definition: Definition,
}
