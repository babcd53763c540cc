//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because callers act on
//! them (drop a stale item, show the field messages). Every other non-2xx
//! response lands in `HttpError` with the raw status and body.

use thiserror::Error;

use crate::types::FieldError;

/// Errors returned by `TodoClient` methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the todo (or route) does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The server returned 400. `errors` is empty when the id or the body as
    /// a whole was rejected rather than a specific field.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
