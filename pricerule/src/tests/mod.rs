use crate::{Definition, Variable, VariableType};




// Analysis tests
mod collision;

// Model and output tests
mod engine;
mod serializers;

/// Reserved variables plus a text `city` and a number `rate`
pub(crate) fn test_definition() -> Definition {
    let mut definition = Definition::with_reserved();
    definition
        .variables
        .push(Variable::new("city", "City", VariableType::Text));
    definition
        .variables
        .push(Variable::new("rate", "Hourly rate", VariableType::Number));
    definition
}

pub(crate) fn test_variables() -> Vec<Variable> {
    test_definition().variables
}
