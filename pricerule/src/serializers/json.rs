use crate::resource_limits::ResourceLimits;
use crate::semantic::{Definition, Rule};
use crate::validator::Validator;
use crate::RuleResult;

/// Serialize a definition to the JSON shape the dashboard stores
pub fn to_json(definition: &Definition) -> RuleResult<String> {
    Ok(serde_json::to_string_pretty(definition)?)
}

/// Load a stored definition and check every structural invariant on it
pub fn from_json(json: &str, limits: &ResourceLimits) -> RuleResult<Definition> {
    limits.check_json_size(json)?;
    let definition: Definition = serde_json::from_str(json)?;
    Validator::new().validate_definition(&definition, limits)?;
    Ok(definition)
}

pub fn rule_to_json(rule: &Rule) -> RuleResult<String> {
    Ok(serde_json::to_string_pretty(rule)?)
}

pub fn rule_from_json(json: &str, limits: &ResourceLimits) -> RuleResult<Rule> {
    limits.check_json_size(json)?;
    let rule: Rule = serde_json::from_str(json)?;
    Validator::new().validate_definition(&rule.definition, limits)?;
    Ok(rule)
}
