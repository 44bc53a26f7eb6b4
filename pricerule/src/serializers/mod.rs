//! Output formats for definitions
//!
//! `text` renders the canonical rule text an author would type; `json` is
//! the storage shape read and written by the dashboard.

pub mod json;
pub mod text;

pub use json::{from_json, rule_from_json, rule_to_json, to_json};
pub use text::{serialize, serialize_clause, serialize_conditions};
