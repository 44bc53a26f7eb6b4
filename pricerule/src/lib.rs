//! # Pricerule Engine
//!
//! **Conditional pricing rules for marketplace partners**
//!
//! Partners describe how a booking is priced with a short rule such as
//! `IF booking_hours >= 4 THEN booking_hours * 10 ELSE booking_hours * 8`.
//! This crate parses that text, checks it against the declared variables,
//! rejects contradictory conditions and renders it back in canonical form.
//! It never prices a real booking.
//!
//! ## Quick Start
//!
//! ```rust
//! use pricerule::{Definition, Engine, RuleResult};
//!
//! fn main() -> RuleResult<()> {
//!     let engine = Engine::new();
//!     let definition = Definition::with_reserved();
//!
//!     let updated = engine.apply_expression(
//!         &definition,
//!         "if booking_hours >= 4 then booking_hours * 10 else booking_hours * 8",
//!     )?;
//!
//!     assert_eq!(
//!         engine.serialize(&updated),
//!         "IF booking_hours >= 4 THEN booking_hours * 10 ELSE booking_hours * 8"
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Variables
//! Every definition declares typed variables (number, text, date, time).
//! A handful of booking variables are reserved and always present.
//!
//! ### Conditions
//! A flat list of comparisons joined by `AND`/`OR`. There is no grouping
//! syntax: each `OR` starts a new AND-group, read left to right.
//!
//! ### Formulas
//! Arithmetic over number variables, optionally split by `ELSE`.
//!
//! ### Consistency
//! Within one AND-group, constraints on a variable must leave at least one
//! possible value, and the same constraint may not appear twice.

pub mod analysis;
pub mod ast;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod resource_limits;
pub mod semantic;
pub mod serializers;
pub mod validator;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use analysis::{detect_collisions, detect_duplicate_clauses};
pub use ast::{ConditionId, ConditionIdGenerator};
pub use engine::Engine;
pub use error::{ErrorCategory, RuleError};
pub use evaluator::evaluate;
pub use parser::{parse_rule, ParsedClause};
pub use resource_limits::ResourceLimits;
pub use semantic::*;
pub use validator::Validator;

/// Result type for rule engine operations
pub type RuleResult<T> = Result<T, RuleError>;

#[cfg(test)]
mod tests;
