use ariadne::{Color, Label, Report, ReportKind, Source};
use pricerule::{ErrorCategory, RuleError};
use std::fmt;

/// A rule error together with the text it was raised for
#[derive(Debug)]
pub struct SourcedError {
    pub error: RuleError,
    pub source_id: String,
    pub source_text: String,
}

impl SourcedError {
    pub fn new(error: RuleError, source_id: &str, source_text: &str) -> Self {
        Self {
            error,
            source_id: source_id.to_string(),
            source_text: source_text.to_string(),
        }
    }
}

impl fmt::Display for SourcedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for SourcedError {}

/// Format a rule error without source text
pub fn format_error(error: &RuleError) -> String {
    match error {
        RuleError::ResourceLimitExceeded {
            limit_name,
            limit_value,
            actual_value,
        } => format!(
            "Resource limit exceeded: {}\n  Limit: {}\n  Actual: {}",
            limit_name, limit_value, actual_value
        ),
        _ => format!("{} error: {}", title(error.category()), error),
    }
}

/// Format a rule error with an Ariadne report pointing into its source text
///
/// Falls back to [`format_error`] when the error names nothing that can be
/// found in the text.
pub fn format_sourced(sourced: &SourcedError) -> String {
    let Some(span) = locate(&sourced.error, &sourced.source_text) else {
        return format_error(&sourced.error);
    };

    let mut output = Vec::new();
    let source_id = &sourced.source_id;
    let report = Report::build(ReportKind::Error, source_id, span.start)
        .with_message(format!(
            "{} error: {}",
            title(sourced.error.category()),
            sourced.error
        ))
        .with_label(
            Label::new((source_id, span))
                .with_message(label(&sourced.error))
                .with_color(Color::Red),
        )
        .finish();

    match report.write(
        (source_id, Source::from(sourced.source_text.as_str())),
        &mut output,
    ) {
        Ok(_) => String::from_utf8_lossy(&output).to_string(),
        Err(_) => format_error(&sourced.error),
    }
}

/// Character range of the error's offending text within `text`
fn locate(error: &RuleError, text: &str) -> Option<std::ops::Range<usize>> {
    let needle = error.offending_text()?.trim();
    if needle.is_empty() {
        return None;
    }
    let byte_start = text.find(needle)?;
    let start = text[..byte_start].chars().count();
    Some(start..start + needle.chars().count())
}

fn title(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Lexical => "Lexical",
        ErrorCategory::Syntax => "Syntax",
        ErrorCategory::Semantic => "Semantic",
        ErrorCategory::Consistency => "Consistency",
        ErrorCategory::Resource => "Resource",
        ErrorCategory::Serialization => "Serialization",
    }
}

fn label(error: &RuleError) -> &'static str {
    match error {
        RuleError::UnknownVariable(_) => "not declared in the definition",
        RuleError::TypeMismatch { .. } => "compared with a value of another type",
        RuleError::ConflictingConditions(_) => "no value satisfies every condition on this",
        RuleError::UnexpectedCharacter { .. } => "unexpected here",
        _ => "here",
    }
}
