//! The todo entity and the values the pipeline hands to a gateway.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of `Todo::text`, counted in characters after trimming.
pub const MAX_TEXT_LEN: usize = 500;

/// A persisted todo item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// A fresh, not yet completed todo with a random id and both timestamps
    /// set to `now`.
    pub fn new(text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch in place. Only the fields carried by the patch change,
    /// and `updated_at` never falls behind `created_at`.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(text) = patch.update.text() {
            self.text = text.to_string();
        }
        if let Some(completed) = patch.update.completed() {
            self.completed = completed;
        }
        self.updated_at = patch.updated_at.max(self.created_at);
    }
}

/// Validated partial update. Always carries at least one change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoUpdate {
    text: Option<String>,
    completed: Option<bool>,
}

impl TodoUpdate {
    /// Returns `None` when neither field is present.
    pub fn new(text: Option<String>, completed: Option<bool>) -> Option<Self> {
        if text.is_none() && completed.is_none() {
            return None;
        }
        Some(Self { text, completed })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn completed(&self) -> Option<bool> {
        self.completed
    }
}

/// What a gateway writes on update: the requested changes plus the refreshed
/// modification time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoPatch {
    pub update: TodoUpdate,
    pub updated_at: DateTime<Utc>,
}

impl TodoPatch {
    pub fn new(update: TodoUpdate, updated_at: DateTime<Utc>) -> Self {
        Self { update, updated_at }
    }
}

/// Current time at microsecond precision, which is what the relational store
/// keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
