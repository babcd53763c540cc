//! Failure taxonomy and the single place where failures become responses.
//!
//! Validators and the pipeline return typed failures ([`TodoError`]); every
//! handler hands its failure to [`ErrorClassifier::classify`] exactly once.
//! The classifier picks one of three shapes:
//!
//! | Failure | Status | Body message |
//! |---|---|---|
//! | `Validation` | 400 | `Validation failed` (+ `errors` when field-level) |
//! | `NotFound` | 404 | `Todo not found` |
//! | `Unexpected` | 500 | generic in production, detailed otherwise |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::GatewayError;

pub const VALIDATION_FAILED: &str = "Validation failed";
pub const TODO_NOT_FOUND: &str = "Todo not found";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable";

/// Machine-readable reason for a single field violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    InvalidType,
    TooSmall,
    TooBig,
    Custom,
}

/// One violated constraint, addressed by its path inside the request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub code: ViolationCode,
    pub path: Vec<String>,
    pub message: String,
}

impl FieldViolation {
    pub fn new(code: ViolationCode, path: &[&str], message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.iter().map(|segment| segment.to_string()).collect(),
            message: message.into(),
        }
    }
}

/// Which part of the request was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationKind {
    /// One or more body fields broke a constraint.
    Fields,
    /// The path identifier is not a hyphenated UUID.
    MalformedId,
    /// The body is not parseable JSON.
    MalformedBody,
}

/// Client input that failed a stated constraint.
///
/// `violations` is non-empty exactly when `kind` is [`ValidationKind::Fields`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    kind: ValidationKind,
    message: String,
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Field-level failure. Callers only build this with at least one violation.
    pub fn fields(violations: Vec<FieldViolation>) -> Self {
        debug_assert!(!violations.is_empty());
        let message = violations
            .iter()
            .map(|violation| {
                if violation.path.is_empty() {
                    violation.message.clone()
                } else {
                    format!("{}: {}", violation.path.join("."), violation.message)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            kind: ValidationKind::Fields,
            message,
            violations,
        }
    }

    pub fn malformed_id() -> Self {
        Self {
            kind: ValidationKind::MalformedId,
            message: "Invalid UUID format".to_string(),
            violations: Vec::new(),
        }
    }

    pub fn malformed_body(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: ValidationKind::MalformedBody,
            message: format!("Malformed JSON body: {detail}"),
            violations: Vec::new(),
        }
    }

    pub fn kind(&self) -> ValidationKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }
}

/// Everything a pipeline operation can fail with.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("todo not found")]
    NotFound,

    #[error(transparent)]
    Unexpected(#[from] GatewayError),
}

/// JSON body shared by every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

/// A status code paired with an [`ErrorBody`].
#[derive(Clone, Debug)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ErrorResponse {
    pub fn route_not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody::new(ROUTE_NOT_FOUND),
        }
    }

    pub fn service_unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: ErrorBody::new(SERVICE_UNAVAILABLE),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Converts failures into responses, logging client faults at `warn` and
/// server faults at `error`.
#[derive(Clone, Copy, Debug)]
pub struct ErrorClassifier {
    expose_details: bool,
}

impl ErrorClassifier {
    /// `expose_details` puts the raw error text into 500 bodies.
    pub fn new(expose_details: bool) -> Self {
        Self { expose_details }
    }

    pub fn classify(&self, error: &TodoError) -> ErrorResponse {
        match error {
            TodoError::Validation(validation) => {
                tracing::warn!(
                    kind = ?validation.kind(),
                    violations = validation.violations().len(),
                    "validation error: {}",
                    validation.message()
                );
                ErrorResponse {
                    status: StatusCode::BAD_REQUEST,
                    body: ErrorBody {
                        errors: validation.violations().to_vec(),
                        ..ErrorBody::new(VALIDATION_FAILED)
                    },
                }
            }
            TodoError::NotFound => {
                tracing::warn!(status = 404, "{TODO_NOT_FOUND}");
                ErrorResponse {
                    status: StatusCode::NOT_FOUND,
                    body: ErrorBody::new(TODO_NOT_FOUND),
                }
            }
            TodoError::Unexpected(cause) => {
                tracing::error!(error = %cause, "unexpected error");
                let message = if self.expose_details {
                    cause.to_string()
                } else {
                    INTERNAL_SERVER_ERROR.to_string()
                };
                ErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody::new(message),
                }
            }
        }
    }
}
