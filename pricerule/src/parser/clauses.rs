//! Splitting rule text into independent IF clauses
//!
//! A top-level `AND`/`OR` only starts a new clause when the next word is
//! `IF`; otherwise it belongs to the current clause's conditions.

use super::scan::{self, KeywordMatch};
use crate::semantic::Connector;
use crate::{RuleError, RuleResult};

/// Raw text of one clause and the connector joining it to the previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseText<'a> {
    pub text: &'a str,
    pub connector: Option<Connector>,
}

pub fn split_clauses(text: &str) -> RuleResult<Vec<ClauseText<'_>>> {
    if text.trim().is_empty() {
        return Err(RuleError::EmptyExpression);
    }
    let keywords = scan::find_keywords(text, &["AND", "OR", "IF"])?;

    let mut segments = Vec::new();
    let mut start = 0;
    let mut connector = None;

    for pair in keywords.windows(2) {
        let (joiner, next) = (&pair[0], &pair[1]);
        if !starts_new_clause(text, joiner, next) {
            continue;
        }
        segments.push(segment(text, start, joiner.start, connector)?);
        connector = Some(connector_for(joiner));
        start = next.start;
    }
    segments.push(segment(text, start, text.len(), connector)?);

    Ok(segments)
}

fn starts_new_clause(text: &str, joiner: &KeywordMatch, next: &KeywordMatch) -> bool {
    joiner.keyword != "IF"
        && next.keyword == "IF"
        && text[joiner.end..next.start].trim().is_empty()
}

fn connector_for(joiner: &KeywordMatch) -> Connector {
    if joiner.keyword == "OR" {
        Connector::Or
    } else {
        Connector::And
    }
}

fn segment(
    text: &str,
    start: usize,
    end: usize,
    connector: Option<Connector>,
) -> RuleResult<ClauseText<'_>> {
    let clause = text[start..end].trim();
    if clause.is_empty() {
        let context = match connector {
            Some(c) => format!("after {}", c.keyword()),
            None => "before the first IF clause".to_string(),
        };
        return Err(RuleError::MissingOperand(context));
    }
    Ok(ClauseText {
        text: clause,
        connector,
    })
}
