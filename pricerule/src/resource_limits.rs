use crate::{RuleError, RuleResult};

/// Resource limits to keep per-keystroke validation bounded
///
/// The engine runs on every edit of the expression field, so these limits
/// protect against pasted garbage while being generous enough for all
/// legitimate pricing rules.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum size of the rule text in bytes
    /// Real usage: ~200 bytes, Limit: 16KB
    pub max_rule_text_bytes: usize,

    /// Maximum nesting depth of arithmetic expressions
    /// Real usage: ~3 levels, Limit: 64
    pub max_expression_depth: usize,

    /// Maximum number of conditions in one clause
    /// Real usage: ~4, Limit: 100
    pub max_conditions: usize,

    /// Maximum number of IF clauses in one rule text
    /// Real usage: ~3, Limit: 32
    pub max_clauses: usize,

    /// Maximum size of a stored definition's JSON in bytes
    /// Real usage: ~2KB, Limit: 1MB
    pub max_definition_json_bytes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_rule_text_bytes: 16 * 1024, // 16 KB
            max_expression_depth: 64,
            max_conditions: 100,
            max_clauses: 32,
            max_definition_json_bytes: 1024 * 1024, // 1 MB
        }
    }
}

impl ResourceLimits {
    /// Create a new ResourceLimits with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn check_text_size(&self, text: &str) -> RuleResult<()> {
        if text.len() > self.max_rule_text_bytes {
            return Err(RuleError::limit_exceeded(
                "max_rule_text_bytes",
                format!("{} bytes", self.max_rule_text_bytes),
                format!("{} bytes", text.len()),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_json_size(&self, json: &str) -> RuleResult<()> {
        if json.len() > self.max_definition_json_bytes {
            return Err(RuleError::limit_exceeded(
                "max_definition_json_bytes",
                format!("{} bytes", self.max_definition_json_bytes),
                format!("{} bytes", json.len()),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_condition_count(&self, count: usize) -> RuleResult<()> {
        if count > self.max_conditions {
            return Err(RuleError::limit_exceeded(
                "max_conditions",
                self.max_conditions,
                count,
            ));
        }
        Ok(())
    }

    pub(crate) fn check_clause_count(&self, count: usize) -> RuleResult<()> {
        if count > self.max_clauses {
            return Err(RuleError::limit_exceeded("max_clauses", self.max_clauses, count));
        }
        Ok(())
    }
}
