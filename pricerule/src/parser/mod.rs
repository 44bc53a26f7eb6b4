use crate::ast::ConditionIdGenerator;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Condition, Connector, Variable};
use crate::{RuleError, RuleResult};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

pub mod clauses;
pub mod conditions;
pub mod literals;
pub mod operands;
pub(crate) mod scan;

#[derive(Parser)]
#[grammar = "src/parser/formula.pest"]
pub struct FormulaParser;

/// Parse an arithmetic text into its pest tree, rooted at `expression`.
///
/// Parenthesis balance and nesting depth are checked before the grammar
/// runs so that neither surfaces as a generic syntax error or as deep
/// recursion inside pest.
pub(crate) fn parse_arithmetic<'i>(
    text: &'i str,
    limits: &ResourceLimits,
) -> RuleResult<Pair<'i, Rule>> {
    if text.trim().is_empty() {
        return Err(RuleError::EmptyExpression);
    }
    scan::check_parentheses(text)?;
    let depth = scan::nesting_depth(text);
    if depth > limits.max_expression_depth {
        return Err(RuleError::limit_exceeded(
            "max_expression_depth",
            limits.max_expression_depth,
            depth,
        ));
    }

    let mut pairs = FormulaParser::parse(Rule::formula, text).map_err(|e| {
        let position = match e.location {
            pest::error::InputLocation::Pos(pos) => pos,
            pest::error::InputLocation::Span((start, _)) => start,
        };
        let found = text
            .get(position..)
            .and_then(|rest| rest.chars().next())
            .map(|ch| ch.to_string())
            .unwrap_or_else(|| "end of input".to_string());
        RuleError::UnexpectedCharacter { found, position }
    })?;

    pairs
        .next()
        .and_then(|formula| formula.into_inner().next())
        .filter(|pair| pair.as_rule() == Rule::expression)
        .ok_or(RuleError::EmptyExpression)
}

/// One `IF ... THEN ... ELSE ...` unit (or a bare formula) after parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClause {
    /// How this clause joins the previous one; `None` for the first
    pub connector: Option<Connector>,
    pub conditions: Vec<Condition>,
    pub then_formula: String,
    pub else_formula: Option<String>,
}

impl ParsedClause {
    /// The formula as stored on a definition, keeping the ELSE split
    pub fn formula(&self) -> String {
        match &self.else_formula {
            Some(otherwise) => format!("{} ELSE {}", self.then_formula, otherwise),
            None => self.then_formula.clone(),
        }
    }
}

/// Parse rule text holding one or more clauses.
///
/// Every clause is fully parsed and type-checked and each formula is
/// validated. Consistency checks (collisions, duplicates) are left to
/// `analysis`.
pub fn parse_rule(
    text: &str,
    variables: &[Variable],
    limits: &ResourceLimits,
) -> RuleResult<Vec<ParsedClause>> {
    limits.check_text_size(text)?;

    let segments = clauses::split_clauses(text)?;
    limits.check_clause_count(segments.len())?;

    let mut id_gen = ConditionIdGenerator::new();
    let mut parsed = Vec::with_capacity(segments.len());
    for segment in segments {
        let mut clause = parse_clause(segment.text, variables, &mut id_gen, limits)?;
        clause.connector = segment.connector;
        parsed.push(clause);
    }

    debug!(
        clauses = parsed.len(),
        conditions = parsed.iter().map(|c| c.conditions.len()).sum::<usize>(),
        "parsed rule text"
    );
    Ok(parsed)
}

/// Parse a single clause: `IF <conditions> THEN <formula> [ELSE <formula>]`
/// or a bare formula.
pub fn parse_clause(
    text: &str,
    variables: &[Variable],
    id_gen: &mut ConditionIdGenerator,
    limits: &ResourceLimits,
) -> RuleResult<ParsedClause> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RuleError::EmptyExpression);
    }

    let keywords = scan::find_keywords(text, &["IF", "THEN", "ELSE"])?;
    let starts_with_if = keywords
        .first()
        .map(|m| m.start == 0 && m.keyword == "IF")
        .unwrap_or(false);

    if !starts_with_if {
        crate::validator::validate_formula(text, variables, limits)?;
        return Ok(ParsedClause {
            connector: None,
            conditions: Vec::new(),
            then_formula: text.to_string(),
            else_formula: None,
        });
    }

    let if_end = keywords[0].end;
    let then_match = keywords
        .iter()
        .find(|m| m.keyword == "THEN")
        .ok_or(RuleError::MissingThen)?;
    let else_match = keywords
        .iter()
        .find(|m| m.keyword == "ELSE" && m.start > then_match.start);

    let condition_text = text[if_end..then_match.start].trim();
    if condition_text.is_empty() {
        return Err(RuleError::MissingOperand("after IF".to_string()));
    }

    let then_end = else_match.map(|m| m.start).unwrap_or(text.len());
    let then_formula = text[then_match.end..then_end].trim();
    if then_formula.is_empty() {
        return Err(RuleError::MissingFormula("THEN".to_string()));
    }

    let else_formula = match else_match {
        Some(m) => {
            let otherwise = text[m.end..].trim();
            if otherwise.is_empty() {
                return Err(RuleError::MissingFormula("ELSE".to_string()));
            }
            Some(otherwise)
        }
        None => None,
    };

    let conditions = conditions::parse_conditions(condition_text, variables, id_gen, limits)?;

    crate::validator::validate_formula(then_formula, variables, limits)?;
    if let Some(otherwise) = else_formula {
        crate::validator::validate_formula(otherwise, variables, limits)?;
    }

    Ok(ParsedClause {
        connector: None,
        conditions,
        then_formula: then_formula.to_string(),
        else_formula: else_formula.map(str::to_string),
    })
}

/// Split a stored formula at its top-level ELSE.
///
/// Formulas are validated before they are stored, so a formula that cannot
/// be scanned is returned whole.
pub fn split_formula(formula: &str) -> (&str, Option<&str>) {
    match scan::find_keywords(formula, &["ELSE"]) {
        Ok(matches) => match matches.first() {
            Some(m) => (formula[..m.start].trim(), Some(formula[m.end..].trim())),
            None => (formula.trim(), None),
        },
        Err(_) => (formula.trim(), None),
    }
}
