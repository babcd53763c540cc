use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GatewayError, TodoGateway};
use crate::model::{now, Todo, TodoPatch};

/// Process-local store. Clones share the same rows.
///
/// Rows are kept in a `Vec` so `select_all` returns insertion order; lookups
/// are linear, which is fine for a single user's list.
#[derive(Clone, Debug, Default)]
pub struct MemoryGateway {
    todos: Arc<RwLock<Vec<Todo>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`GatewayError::Unavailable`]
    /// (or succeed again). Lets tests exercise the server-fault paths.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl TodoGateway for MemoryGateway {
    async fn select_all(&self) -> Result<Vec<Todo>, GatewayError> {
        self.check_online()?;
        Ok(self.todos.read().await.clone())
    }

    async fn insert(&self, text: String) -> Result<Todo, GatewayError> {
        self.check_online()?;
        let todo = Todo::new(text, now());
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update_by_id(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, GatewayError> {
        self.check_online()?;
        let mut todos = self.todos.write().await;
        Ok(todos.iter_mut().find(|todo| todo.id == id).map(|todo| {
            todo.apply(&patch);
            todo.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Todo>, GatewayError> {
        self.check_online()?;
        let mut todos = self.todos.write().await;
        Ok(todos
            .iter()
            .position(|todo| todo.id == id)
            .map(|index| todos.remove(index)))
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        self.check_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TodoUpdate;

    #[tokio::test]
    async fn select_all_preserves_insertion_order() {
        let gateway = MemoryGateway::new();
        for text in ["first", "second", "third"] {
            gateway.insert(text.to_string()).await.unwrap();
        }
        let texts: Vec<_> = gateway
            .select_all()
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.text)
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let gateway = MemoryGateway::new();
        let patch = TodoPatch::new(TodoUpdate::new(None, Some(true)).unwrap(), now());
        assert!(gateway.update_by_id(Uuid::nil(), patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let gateway = MemoryGateway::new();
        let todo = gateway.insert("gone".to_string()).await.unwrap();

        let deleted = gateway.delete_by_id(todo.id).await.unwrap();
        assert_eq!(deleted, Some(todo.clone()));
        assert!(gateway.delete_by_id(todo.id).await.unwrap().is_none());
        assert!(gateway.select_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_rows() {
        let gateway = MemoryGateway::new();
        let other = gateway.clone();
        gateway.insert("shared".to_string()).await.unwrap();
        assert_eq!(other.select_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let gateway = MemoryGateway::new();
        gateway.set_offline(true);
        assert!(matches!(gateway.ping().await, Err(GatewayError::Unavailable(_))));
        assert!(gateway.select_all().await.is_err());
        assert!(gateway.insert("x".to_string()).await.is_err());

        gateway.set_offline(false);
        assert!(gateway.ping().await.is_ok());
    }
}
