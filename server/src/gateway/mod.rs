//! Persistence gateway: the only component that touches stored todos.
//!
//! The pipeline talks to storage through [`TodoGateway`] and never holds
//! state of its own. Each method is one atomic store operation. Update and
//! delete report an absent row as `Ok(None)`; the pipeline decides that this
//! means "not found".

mod memory;
mod sqlite;

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::model::{Todo, TodoPatch};

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

/// Failures of the backing store. Always a server fault.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    CorruptRow(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Abstract store over the todo table.
pub trait TodoGateway: Send + Sync + 'static {
    /// Every todo in insertion order.
    fn select_all(&self) -> impl Future<Output = Result<Vec<Todo>, GatewayError>> + Send;

    /// Store a new todo with the given (already validated) text. The store
    /// assigns the id and both timestamps.
    fn insert(&self, text: String) -> impl Future<Output = Result<Todo, GatewayError>> + Send;

    /// Apply `patch` to the row with `id`, returning the updated row.
    fn update_by_id(
        &self,
        id: Uuid,
        patch: TodoPatch,
    ) -> impl Future<Output = Result<Option<Todo>, GatewayError>> + Send;

    /// Physically remove the row with `id`, returning what was removed.
    fn delete_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<Todo>, GatewayError>> + Send;

    /// Cheap liveness probe used by the health endpoint.
    fn ping(&self) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
