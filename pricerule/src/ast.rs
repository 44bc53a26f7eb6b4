//! Parse infrastructure types
//!
//! - `ConditionId` for identifying conditions inside a definition
//! - `ConditionIdGenerator` for handing out ids while parsing
//! - `DepthGuard` for bounding recursion while walking expressions

use crate::{RuleError, RuleResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a condition within a definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionId(String);

impl ConditionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter for generating condition ids
///
/// Ids are sequential per parse, so parsing the same text twice yields the
/// same ids.
#[derive(Debug, Default)]
pub struct ConditionIdGenerator {
    next_id: u64,
}

impl ConditionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ConditionId {
        self.next_id += 1;
        ConditionId(format!("cond_{}", self.next_id))
    }
}

/// Tracks recursion depth against a fixed ceiling
#[derive(Debug)]
pub struct DepthGuard {
    depth: usize,
    max_depth: usize,
}

impl DepthGuard {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    pub fn push(&mut self) -> RuleResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RuleError::limit_exceeded(
                "max_expression_depth",
                self.max_depth,
                self.depth,
            ));
        }
        Ok(())
    }

    pub fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
