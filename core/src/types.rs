//! Wire types for the todo API.
//!
//! # Design
//! These mirror the server's JSON but are defined independently, so the
//! client does not pull in Axum or the storage stack. The integration test
//! runs against the real server and catches schema drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new todo. New todos always start
/// incomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub text: String,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; the server rejects a payload with neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Body of a successful delete: a confirmation and the removed item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedTodo {
    pub message: String,
    pub todo: Todo,
}

/// Body of a healthy `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: f64,
    pub environment: String,
}

/// One rejected field in a 400 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub code: String,
    pub path: Vec<String>,
    pub message: String,
}

/// Error body shared by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}
