//! Static schema for book payloads.
//!
//! Payloads are checked structurally against [`BOOK_SCHEMA`] before any
//! typed deserialization happens, so a single pass reports every violated
//! field instead of stopping at the first one.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Number, Value};

use super::models::{Book, BookUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string
    Text,
    /// Integer in `1..=i32::MAX`, the range of the backing column
    PositiveInteger,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    fn check(&self, value: Option<&Value>) -> Option<Violation> {
        let error = match (value, self.kind) {
            (None | Some(Value::Null), _) if self.required => "is required".to_string(),
            (None | Some(Value::Null), _) => return None,
            (Some(Value::String(text)), FieldKind::Text) if text.trim().is_empty() => {
                "must not be empty".to_string()
            }
            (Some(Value::String(_)), FieldKind::Text) => return None,
            (Some(_), FieldKind::Text) => "must be a string".to_string(),
            (Some(Value::Number(number)), FieldKind::PositiveInteger) => {
                match integer(number) {
                    None => "must be an integer".to_string(),
                    Some(n) if n < 1 => "must be a positive integer".to_string(),
                    Some(n) if n > i64::from(i32::MAX) => format!("must be at most {}", i32::MAX),
                    Some(_) => return None,
                }
            }
            (Some(_), FieldKind::PositiveInteger) => "must be an integer".to_string(),
        };
        Some(Violation::new(self.name, error))
    }
}

/// Integral value of a JSON number, so `1999.0` counts the same as `1999`.
fn integer(number: &Number) -> Option<i64> {
    // u64 values beyond i64 are still integers, just too large
    number
        .as_i64()
        .or_else(|| number.as_u64().map(|_| i64::MAX))
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        })
}

pub const ISBN: &str = "isbn";

pub const BOOK_SCHEMA: &[FieldRule] = &[
    FieldRule::required(ISBN, FieldKind::Text),
    FieldRule::required("amazon_url", FieldKind::Text),
    FieldRule::required("author", FieldKind::Text),
    FieldRule::required("language", FieldKind::Text),
    FieldRule::required("pages", FieldKind::PositiveInteger),
    FieldRule::required("publisher", FieldKind::Text),
    FieldRule::required("title", FieldKind::Text),
    FieldRule::required("year", FieldKind::PositiveInteger),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub error: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid book payload: {}", field_list(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }
}

fn field_list(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn check<'r>(payload: &Value, rules: impl Iterator<Item = &'r FieldRule>) -> Vec<Violation> {
    let Some(object) = payload.as_object() else {
        return vec![Violation::new("body", "must be a JSON object")];
    };

    rules
        .filter_map(|rule| rule.check(object.get(rule.name)))
        .collect()
}

/// Deserialize an already checked payload, rewriting integral floats to
/// integers first since the typed fields are `i32`.
fn typed<T: DeserializeOwned>(payload: &Value) -> Result<T, ValidationError> {
    let mut payload = payload.clone();
    for rule in BOOK_SCHEMA {
        if rule.kind != FieldKind::PositiveInteger {
            continue;
        }
        let Some(slot) = payload.get_mut(rule.name) else {
            continue;
        };
        if let Some(n) = slot.as_f64().filter(|f| f.fract() == 0.0) {
            if slot.is_f64() {
                *slot = Value::from(n as i64);
            }
        }
    }
    serde_json::from_value(payload).map_err(|err| ValidationError {
        violations: vec![Violation::new("body", err.to_string())],
    })
}

/// Validate a create payload: every field of [`BOOK_SCHEMA`].
pub fn validate_new_book(payload: &Value) -> Result<Book, ValidationError> {
    let violations = check(payload, BOOK_SCHEMA.iter());
    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }
    typed(payload)
}

/// Validate a full-update payload: every field except `isbn`. A payload
/// that repeats the key must repeat it unchanged.
pub fn validate_book_update(isbn: &str, payload: &Value) -> Result<BookUpdate, ValidationError> {
    let rules = BOOK_SCHEMA.iter().filter(|rule| rule.name != ISBN);
    let mut violations = check(payload, rules);

    match payload.get(ISBN) {
        None | Some(Value::Null) => {}
        Some(Value::String(given)) if given == isbn => {}
        Some(_) => violations.push(Violation::new(ISBN, "cannot be changed")),
    }

    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }
    typed(payload)
}
