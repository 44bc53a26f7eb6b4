//! Quote- and parenthesis-aware scanning shared by the splitters
//!
//! Keywords, connectors and comparators only count when they appear at the
//! top level of the text: outside any quoted literal and outside any
//! parenthesised group.

use crate::semantic::KEYWORDS;
use crate::{RuleError, RuleResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Per-byte flags telling which positions of `text` are top level.
///
/// Only char-start positions can be `true`. Quote characters and the
/// outermost parentheses are themselves top level; their contents are not.
pub(crate) fn top_level_mask(text: &str) -> RuleResult<Vec<bool>> {
    let mut mask = vec![false; text.len()];
    let mut quote: Option<(char, usize)> = None;
    let mut depth: usize = 0;

    for (index, ch) in text.char_indices() {
        match quote {
            Some((open, _)) => {
                if ch == open {
                    quote = None;
                    mask[index] = depth == 0;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    mask[index] = depth == 0;
                    quote = Some((ch, index));
                }
                '(' => {
                    mask[index] = depth == 0;
                    depth += 1;
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    mask[index] = depth == 0;
                }
                _ => mask[index] = depth == 0,
            },
        }
    }

    if let Some((_, position)) = quote {
        return Err(RuleError::UnterminatedLiteral { position });
    }
    Ok(mask)
}

/// A keyword found at the top level of a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeywordMatch {
    pub start: usize,
    pub end: usize,
    /// The keyword as listed by the caller, not as written in the text
    pub keyword: &'static str,
}

/// Find every top-level, whitespace-bounded occurrence of the given
/// keywords, case-insensitively, left to right.
pub(crate) fn find_keywords(
    text: &str,
    keywords: &[&'static str],
) -> RuleResult<Vec<KeywordMatch>> {
    let mask = top_level_mask(text)?;
    let mut found = Vec::new();
    let mut index = 0;

    while index < text.len() {
        if !mask[index] {
            index += 1;
            continue;
        }
        let hit = keywords.iter().find(|keyword| {
            let end = index + keyword.len();
            text.get(index..end)
                .map(|candidate| candidate.eq_ignore_ascii_case(keyword))
                .unwrap_or(false)
                && is_word_bounded(text, index, end)
        });
        match hit {
            Some(&keyword) => {
                let end = index + keyword.len();
                found.push(KeywordMatch {
                    start: index,
                    end,
                    keyword,
                });
                index = end;
            }
            None => index += 1,
        }
    }

    Ok(found)
}

/// True when `text[start..end]` has whitespace or a string edge on both sides
pub(crate) fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
}

/// Check that parentheses outside quoted literals balance
pub(crate) fn check_parentheses(text: &str) -> RuleResult<()> {
    let mut quote: Option<char> = None;
    let mut depth: i64 = 0;
    for ch in text.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(RuleError::UnbalancedParentheses);
                    }
                }
                _ => {}
            },
        }
    }
    if depth != 0 {
        return Err(RuleError::UnbalancedParentheses);
    }
    Ok(())
}

/// Rough nesting estimate used to refuse pathological input before the
/// recursive grammar sees it: open parentheses plus runs of unary signs.
pub(crate) fn nesting_depth(text: &str) -> usize {
    let mut max_depth = 0;
    let mut parens: usize = 0;
    let mut sign_run: usize = 0;
    for ch in text.chars() {
        match ch {
            '(' => {
                parens += 1;
                sign_run = 0;
            }
            ')' => {
                parens = parens.saturating_sub(1);
                sign_run = 0;
            }
            '+' | '-' => sign_run += 1,
            c if c.is_whitespace() => {}
            _ => sign_run = 0,
        }
        max_depth = max_depth.max(parens + sign_run);
    }
    max_depth
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("identifier pattern is valid")
    })
}

/// Identifiers referenced by an arithmetic text, keywords excluded
pub fn identifiers(text: &str) -> BTreeSet<String> {
    identifier_regex()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)))
        .map(str::to_string)
        .collect()
}
