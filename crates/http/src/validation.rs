//! Declarative validation and sanitization of submitted form fields.
//!
//! A [`FieldRule`] is an ordered chain of steps applied to one field.
//! Sanitizers rewrite the value, validators record an error when their
//! predicate fails. A failing validator never stops the chain, and every
//! field is checked, so the caller sees all problems at once.
//!
//! ```
//! use libris_http::form::FormData;
//! use libris_http::validation::{field, validate};
//!
//! let form: FormData = [("name", "  Poetry ")].into_iter().collect();
//! let rules = [field("name").message("too short").trim().min_length(3).escape()];
//! let outcome = validate(&form, &rules);
//! assert!(outcome.is_valid());
//! assert_eq!(outcome.text("name"), "Poetry");
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::form::FormData;

/// Message used when neither the validator nor the field names one.
pub const DEFAULT_MESSAGE: &str = "Invalid value";

/// One failed validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub value: String,
}

/// A field after its chain ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Missing,
    Text(String),
    Date(NaiveDate),
    List(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    MinLength(usize),
    MaxLength(usize),
    Alphanumeric,
    Iso8601,
}

impl Check {
    fn passes(self, value: &str) -> bool {
        match self {
            Check::MinLength(min) => value.chars().count() >= min,
            Check::MaxLength(max) => value.chars().count() <= max,
            Check::Alphanumeric => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
            }
            Check::Iso8601 => parse_iso8601(value).is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Trim,
    Escape,
    ToDate,
    Check {
        check: Check,
        message: Option<&'static str>,
    },
}

/// Validation chain for a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    field: &'static str,
    message: Option<&'static str>,
    optional: bool,
    each: bool,
    steps: Vec<Step>,
}

/// Start a chain for `name`.
pub fn field(name: &'static str) -> FieldRule {
    FieldRule {
        field: name,
        message: None,
        optional: false,
        each: false,
        steps: Vec::new(),
    }
}

impl FieldRule {
    pub fn name(&self) -> &'static str {
        self.field
    }

    /// Default message for every validator in the chain.
    pub fn message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// Message for the validator added just before this call.
    pub fn with_message(mut self, message: &'static str) -> Self {
        if let Some(Step::Check { message: slot, .. }) = self.steps.last_mut() {
            *slot = Some(message);
        }
        self
    }

    /// Skip the whole chain when the field is missing or empty.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Apply the chain to every submitted value of a repeated field.
    pub fn each(mut self) -> Self {
        self.each = true;
        self
    }

    pub fn trim(self) -> Self {
        self.step(Step::Trim)
    }

    /// Replace characters that are significant in HTML with entities.
    pub fn escape(self) -> Self {
        self.step(Step::Escape)
    }

    /// Convert an ISO-8601 string to a date; unparseable input becomes missing.
    pub fn to_date(self) -> Self {
        self.step(Step::ToDate)
    }

    pub fn min_length(self, min: usize) -> Self {
        self.check(Check::MinLength(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.check(Check::MaxLength(max))
    }

    /// ASCII letters and digits only.
    pub fn alphanumeric(self) -> Self {
        self.check(Check::Alphanumeric)
    }

    pub fn iso8601(self) -> Self {
        self.check(Check::Iso8601)
    }

    fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    fn check(self, check: Check) -> Self {
        self.step(Step::Check {
            check,
            message: None,
        })
    }

    fn apply(&self, form: &FormData, errors: &mut Vec<FieldError>) -> FieldValue {
        if self.each {
            let values = form
                .all(self.field)
                .into_iter()
                .filter_map(|raw| match self.run(Some(raw), errors) {
                    FieldValue::Text(text) => Some(text),
                    FieldValue::Date(date) => Some(date.to_string()),
                    FieldValue::Missing | FieldValue::List(_) => None,
                })
                .collect();
            return FieldValue::List(values);
        }

        self.run(form.get(self.field), errors)
    }

    fn run(&self, raw: Option<&str>, errors: &mut Vec<FieldError>) -> FieldValue {
        if self.optional && raw.map_or(true, str::is_empty) {
            return FieldValue::Missing;
        }

        let mut current = raw.map(str::to_string);
        let mut date: Option<Option<NaiveDate>> = None;

        for step in &self.steps {
            match step {
                Step::Trim => {
                    if let Some(value) = current.as_mut() {
                        *value = value.trim().to_string();
                    }
                }
                Step::Escape => {
                    if let Some(value) = current.as_mut() {
                        *value = escape_html(value);
                    }
                }
                Step::ToDate => {
                    date = Some(current.as_deref().and_then(parse_iso8601));
                }
                Step::Check { check, message } => {
                    let value = current.as_deref().unwrap_or_default();
                    if !check.passes(value) {
                        errors.push(FieldError {
                            field: self.field.to_string(),
                            message: message
                                .or(self.message)
                                .unwrap_or(DEFAULT_MESSAGE)
                                .to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
        }

        match date {
            Some(Some(date)) => FieldValue::Date(date),
            Some(None) => FieldValue::Missing,
            None => current.map_or(FieldValue::Missing, FieldValue::Text),
        }
    }
}

/// Result of running a rule set over a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<FieldError>,
    values: HashMap<&'static str, FieldValue>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Sanitized text of a field; missing fields read as empty.
    pub fn text(&self, field: &str) -> String {
        match self.values.get(field) {
            Some(FieldValue::Text(text)) => text.clone(),
            Some(FieldValue::Date(date)) => date.to_string(),
            Some(FieldValue::List(values)) => values.first().cloned().unwrap_or_default(),
            Some(FieldValue::Missing) | None => String::new(),
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(FieldValue::Date(date)) => Some(*date),
            _ => None,
        }
    }

    pub fn list(&self, field: &str) -> Vec<String> {
        match self.values.get(field) {
            Some(FieldValue::List(values)) => values.clone(),
            Some(FieldValue::Text(text)) => vec![text.clone()],
            _ => Vec::new(),
        }
    }
}

/// Run every rule against the form, collecting all errors.
pub fn validate(form: &FormData, rules: &[FieldRule]) -> Validation {
    let mut outcome = Validation::default();
    for rule in rules {
        let value = rule.apply(form, &mut outcome.errors);
        outcome.values.insert(rule.field, value);
    }
    outcome
}

/// Entity-encode `& < > " ' / \` and backtick.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Calendar date of an ISO-8601 date or date-time string.
pub fn parse_iso8601(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|dt| dt.date())
        })
}
