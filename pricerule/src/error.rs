use thiserror::Error;

/// Broad family an error belongs to.
///
/// Front ends use this to pick how an error is presented: lexical and syntax
/// errors point at the text, semantic errors at a variable or literal, and
/// consistency errors at a group of conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Semantic,
    Consistency,
    Resource,
    Serialization,
}

impl ErrorCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCategory::Lexical => "lexical",
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Semantic => "semantic",
            ErrorCategory::Consistency => "consistency",
            ErrorCategory::Resource => "resource",
            ErrorCategory::Serialization => "serialization",
        }
    }
}

/// Error types for the pricing rule engine
///
/// Every error is terminal for the current validation pass. The engine never
/// accepts part of an expression, so callers keep their previous valid
/// definition whenever one of these comes back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    // Lexical
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: String, position: usize },

    #[error("Unterminated text literal starting at position {position}")]
    UnterminatedLiteral { position: usize },

    // Syntax
    #[error("Missing comparator in condition '{0}'")]
    MissingComparator(String),

    #[error("Missing THEN after IF conditions")]
    MissingThen,

    #[error("Missing formula after {0}")]
    MissingFormula(String),

    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("Missing operand {0}")]
    MissingOperand(String),

    #[error("Expression is empty")]
    EmptyExpression,

    #[error("Malformed definition: {0}")]
    InvalidDefinition(String),

    // Semantic
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("'{0}' is not a number, text, date, time or a declared variable")]
    UnrecognizedReference(String),

    #[error("Unknown function '{0}' (expected date, time or datetime)")]
    UnknownFunction(String),

    #[error("Type mismatch for '{variable}': expected {expected}, found {actual}")]
    TypeMismatch {
        variable: String,
        expected: String,
        actual: String,
    },

    #[error("Cannot compare {left} literal with {right} literal")]
    IncompatibleLiterals { left: String, right: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid date '{0}' (expected a real calendar date as YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid time '{0}'")]
    InvalidTime(String),

    #[error("Invalid datetime '{0}' (expected an ISO 8601 date-time)")]
    InvalidDateTime(String),

    #[error("Invalid variable '{key}': {reason}")]
    InvalidVariable { key: String, reason: String },

    #[error("Variable '{0}' is declared more than once")]
    DuplicateVariable(String),

    #[error("Variable '{0}' is still referenced by the rule")]
    VariableInUse(String),

    #[error("Variable '{0}' is reserved and cannot be removed")]
    ReservedVariable(String),

    // Consistency
    #[error("Duplicate condition: {0}")]
    DuplicateCondition(String),

    #[error("Conditions on '{0}' contradict each other")]
    ConflictingConditions(String),

    // Resource
    #[error("Resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})")]
    ResourceLimitExceeded {
        limit_name: String,
        limit_value: String,
        actual_value: String,
    },

    // Serialization
    #[error("Invalid rule JSON: {0}")]
    Json(String),
}

impl RuleError {
    pub fn category(&self) -> ErrorCategory {
        use RuleError::*;
        match self {
            UnexpectedCharacter { .. } | UnterminatedLiteral { .. } => ErrorCategory::Lexical,
            MissingComparator(_)
            | MissingThen
            | MissingFormula(_)
            | UnbalancedParentheses
            | MissingOperand(_)
            | EmptyExpression
            | InvalidDefinition(_) => ErrorCategory::Syntax,
            UnknownVariable(_)
            | UnrecognizedReference(_)
            | UnknownFunction(_)
            | TypeMismatch { .. }
            | IncompatibleLiterals { .. }
            | DivisionByZero
            | InvalidNumber(_)
            | InvalidDate(_)
            | InvalidTime(_)
            | InvalidDateTime(_)
            | InvalidVariable { .. }
            | DuplicateVariable(_)
            | VariableInUse(_)
            | ReservedVariable(_) => ErrorCategory::Semantic,
            DuplicateCondition(_) | ConflictingConditions(_) => ErrorCategory::Consistency,
            ResourceLimitExceeded { .. } => ErrorCategory::Resource,
            Json(_) => ErrorCategory::Serialization,
        }
    }

    /// The piece of input this error is about, when there is one.
    ///
    /// Front ends search for it in the submitted text to place a marker.
    pub fn offending_text(&self) -> Option<&str> {
        use RuleError::*;
        match self {
            UnexpectedCharacter { found, .. } => Some(found),
            MissingComparator(text)
            | UnknownVariable(text)
            | UnrecognizedReference(text)
            | UnknownFunction(text)
            | InvalidDate(text)
            | InvalidTime(text)
            | InvalidDateTime(text)
            | ConflictingConditions(text) => Some(text),
            TypeMismatch { variable, .. } => Some(variable),
            _ => None,
        }
    }

    pub(crate) fn limit_exceeded(
        limit_name: &str,
        limit_value: impl ToString,
        actual_value: impl ToString,
    ) -> Self {
        RuleError::ResourceLimitExceeded {
            limit_name: limit_name.to_string(),
            limit_value: limit_value.to_string(),
            actual_value: actual_value.to_string(),
        }
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Json(err.to_string())
    }
}
