//! Consistency analysis of parsed conditions
//!
//! - `domain`: what a variable may still be after a set of constraints
//! - `collision`: contradictions and repeats inside one AND-group
//! - `signature`: duplicate IF clauses across a rule

pub mod collision;
pub mod domain;
pub mod signature;

pub use collision::{and_groups, detect_collisions, Constraint, ConstraintValue};
pub use domain::{Bound, NumericDomain, TextDomain};
pub use signature::{condition_signature, detect_duplicate_clauses, ClauseSignature};
