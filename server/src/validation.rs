//! Pure checks that turn untrusted request input into normalized values.
//!
//! Bodies arrive as raw [`serde_json::Value`] so that a missing field, a
//! field of the wrong type and an out-of-range field are reported as
//! distinct violations instead of a single deserializer message.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{FieldViolation, ValidationError, ViolationCode};
use crate::model::{TodoUpdate, MAX_TEXT_LEN};

const TEXT: &str = "text";
const COMPLETED: &str = "completed";
const HYPHENATED_UUID_LEN: usize = 36;

/// Validate a create body. Returns the trimmed text.
pub fn validate_create(input: &Value) -> Result<String, ValidationError> {
    let body = as_object(input)?;
    let mut violations = Vec::new();
    let text = match body.get(TEXT) {
        None => {
            violations.push(FieldViolation::new(
                ViolationCode::InvalidType,
                &[TEXT],
                "Required",
            ));
            None
        }
        Some(value) => check_text(value, &mut violations),
    };
    match text {
        Some(text) if violations.is_empty() => Ok(text),
        _ => Err(ValidationError::fields(violations)),
    }
}

/// Validate an update body. At least one of `text` or `completed` must be
/// present, and every present field must satisfy its own constraint.
pub fn validate_update(input: &Value) -> Result<TodoUpdate, ValidationError> {
    let body = as_object(input)?;
    let mut violations = Vec::new();

    let text = body
        .get(TEXT)
        .and_then(|value| check_text(value, &mut violations));

    let completed = match body.get(COMPLETED) {
        None => None,
        Some(Value::Bool(completed)) => Some(*completed),
        Some(other) => {
            violations.push(FieldViolation::new(
                ViolationCode::InvalidType,
                &[COMPLETED],
                format!("Expected boolean, received {}", type_name(other)),
            ));
            None
        }
    };

    if !violations.is_empty() {
        return Err(ValidationError::fields(violations));
    }

    TodoUpdate::new(text, completed).ok_or_else(|| {
        ValidationError::fields(vec![FieldViolation::new(
            ViolationCode::Custom,
            &[],
            "At least one field (text or completed) must be provided",
        )])
    })
}

/// Accept only the hyphenated 8-4-4-4-12 textual UUID form.
pub fn validate_id(raw: &str) -> Result<Uuid, ValidationError> {
    if raw.len() != HYPHENATED_UUID_LEN {
        return Err(ValidationError::malformed_id());
    }
    Uuid::parse_str(raw).map_err(|_| ValidationError::malformed_id())
}

fn as_object(input: &Value) -> Result<&Map<String, Value>, ValidationError> {
    input.as_object().ok_or_else(|| {
        ValidationError::fields(vec![FieldViolation::new(
            ViolationCode::InvalidType,
            &[],
            format!("Expected object, received {}", type_name(input)),
        )])
    })
}

/// Trim and bound-check a `text` value, recording any violation.
fn check_text(value: &Value, violations: &mut Vec<FieldViolation>) -> Option<String> {
    let Value::String(raw) = value else {
        violations.push(FieldViolation::new(
            ViolationCode::InvalidType,
            &[TEXT],
            format!("Expected string, received {}", type_name(value)),
        ));
        return None;
    };

    let text = raw.trim();
    let len = text.chars().count();
    if len == 0 {
        violations.push(FieldViolation::new(
            ViolationCode::TooSmall,
            &[TEXT],
            "Text is required",
        ));
        return None;
    }
    if len > MAX_TEXT_LEN {
        violations.push(FieldViolation::new(
            ViolationCode::TooBig,
            &[TEXT],
            "Text is too long",
        ));
        return None;
    }
    Some(text.to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
