use crate::parser::split_formula;
use crate::semantic::{Condition, Definition};

/// Render a condition list as it would be typed:
/// `booking_hours > 4 AND NOT city = 'Manila'`
pub fn serialize_conditions(conditions: &[Condition]) -> String {
    let mut out = String::new();
    for (index, condition) in conditions.iter().enumerate() {
        if index > 0 {
            out.push(' ');
            if let Some(connector) = condition.connector {
                out.push_str(connector.keyword());
                out.push(' ');
            }
        }
        out.push_str(&condition.to_string());
    }
    out
}

/// Render one clause. Without conditions the formula stands alone.
pub fn serialize_clause(conditions: &[Condition], formula: &str) -> String {
    if conditions.is_empty() {
        return formula.trim().to_string();
    }
    let (then_formula, else_formula) = split_formula(formula);
    let mut out = format!(
        "IF {} THEN {}",
        serialize_conditions(conditions),
        then_formula
    );
    if let Some(otherwise) = else_formula {
        out.push_str(" ELSE ");
        out.push_str(otherwise);
    }
    out
}

/// Canonical text of a whole definition, every clause included
pub fn serialize(definition: &Definition) -> String {
    let mut out = serialize_clause(&definition.conditions, &definition.formula);
    for clause in &definition.additional_clauses {
        out.push(' ');
        out.push_str(clause.connector.keyword());
        out.push(' ');
        out.push_str(&serialize_clause(&clause.conditions, &clause.formula));
    }
    out
}
