//! Per-type input validation with user-facing errors.

use std::fmt;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::catalog::{FieldSpec, FieldType};

use super::values::FieldValue;

/// Canonical date format for both input and substitution output.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Keyword the chat UI offers instead of typing today's date.
const TODAY_KEYWORD: &str = "today";

/// A rejected field submission: which field, why, and how to fix it.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str) -> Self {
        Self::new(field, "value must not be empty")
    }

    pub fn unknown_field(field: &str) -> Self {
        Self::new(field, "no such field in this template")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.reason)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Validate raw chat input against a field's declared type and rule,
/// producing the typed value stored in the `FieldValueSet`.
pub fn validate_raw(spec: &FieldSpec, raw: &str) -> Result<FieldValue, ValidationError> {
    let trimmed = raw.trim();

    match &spec.field_type {
        FieldType::Text { pattern } => validate_text(spec, trimmed, pattern.as_deref()),
        FieldType::Choice { options } => validate_choice(spec, trimmed, options),
        FieldType::Date => validate_date(spec, trimmed),
        FieldType::Number { min, max } => validate_number(spec, trimmed, *min, *max),
    }
}

fn validate_text(
    spec: &FieldSpec,
    trimmed: &str,
    pattern: Option<&str>,
) -> Result<FieldValue, ValidationError> {
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(&spec.key));
    }
    if let Some(pattern) = pattern {
        // Patterns are compile-checked at catalog load; a failure here means
        // the spec was built outside the loader.
        let re = Regex::new(pattern)
            .map_err(|_| ValidationError::new(&spec.key, "invalid pattern rule"))?;
        if !re.is_match(trimmed) {
            return Err(
                ValidationError::new(&spec.key, format!("'{trimmed}' has the wrong format"))
                    .with_suggestion(format!("expected to match {pattern}")),
            );
        }
    }
    Ok(FieldValue::Text(trimmed.to_string()))
}

fn validate_choice(
    spec: &FieldSpec,
    trimmed: &str,
    options: &[String],
) -> Result<FieldValue, ValidationError> {
    if options.iter().any(|o| o == trimmed) {
        Ok(FieldValue::Choice(trimmed.to_string()))
    } else {
        Err(
            ValidationError::new(&spec.key, format!("'{trimmed}' is not one of the options"))
                .with_suggestion(format!("choose one of: {}", options.join(", "))),
        )
    }
}

fn validate_date(spec: &FieldSpec, trimmed: &str) -> Result<FieldValue, ValidationError> {
    if trimmed.eq_ignore_ascii_case(TODAY_KEYWORD) {
        return Ok(FieldValue::Date(Local::now().date_naive()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(FieldValue::Date)
        .map_err(|_| {
            ValidationError::new(&spec.key, format!("'{trimmed}' is not a valid date"))
                .with_suggestion("use DD.MM.YYYY, e.g. 01.03.2024, or 'today'")
        })
}

fn validate_number(
    spec: &FieldSpec,
    trimmed: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<FieldValue, ValidationError> {
    // Users paste amounts with grouping spaces ("150 000").
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let value: i64 = compact.parse().map_err(|_| {
        ValidationError::new(&spec.key, format!("'{trimmed}' is not a number"))
            .with_suggestion("digits only, e.g. 150000")
    })?;

    if min.map(|m| value < m).unwrap_or(false) || max.map(|m| value > m).unwrap_or(false) {
        let range = match (min, max) {
            (Some(lo), Some(hi)) => format!("{lo}..{hi}"),
            (Some(lo), None) => format!("at least {lo}"),
            (None, Some(hi)) => format!("at most {hi}"),
            (None, None) => unreachable!(),
        };
        return Err(
            ValidationError::new(&spec.key, "out of range")
                .with_suggestion(format!("expected {range}")),
        );
    }

    Ok(FieldValue::Number(value))
}
