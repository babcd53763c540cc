//! The four todo operations: validate, make one gateway call, return the
//! entity. Failures come back as [`TodoError`] for the classifier; nothing
//! here retries or shapes HTTP responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TodoError, ValidationError};
use crate::gateway::TodoGateway;
use crate::model::{now, Todo, TodoPatch};
use crate::validation::{validate_create, validate_id, validate_update};

pub const TODO_DELETED: &str = "Todo deleted successfully";

/// Request body as received: parsed JSON, or the reason it could not be parsed.
pub type RequestBody = Result<Value, ValidationError>;

/// Response to a successful delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTodo {
    pub message: String,
    pub todo: Todo,
}

pub async fn list<G: TodoGateway>(gateway: &G) -> Result<Vec<Todo>, TodoError> {
    Ok(gateway.select_all().await?)
}

pub async fn create<G: TodoGateway>(gateway: &G, body: RequestBody) -> Result<Todo, TodoError> {
    let text = validate_create(&body?)?;
    let todo = gateway.insert(text).await?;
    tracing::info!(id = %todo.id, "todo created");
    Ok(todo)
}

/// The id is checked before the body, so a bad id wins over a bad body.
pub async fn update<G: TodoGateway>(
    gateway: &G,
    raw_id: &str,
    body: RequestBody,
) -> Result<Todo, TodoError> {
    let id = validate_id(raw_id)?;
    let update = validate_update(&body?)?;
    let todo = gateway
        .update_by_id(id, TodoPatch::new(update, now()))
        .await?
        .ok_or(TodoError::NotFound)?;
    tracing::info!(%id, completed = todo.completed, "todo updated");
    Ok(todo)
}

pub async fn delete<G: TodoGateway>(gateway: &G, raw_id: &str) -> Result<DeletedTodo, TodoError> {
    let id = validate_id(raw_id)?;
    let todo = gateway.delete_by_id(id).await?.ok_or(TodoError::NotFound)?;
    tracing::info!(%id, "todo deleted");
    Ok(DeletedTodo {
        message: TODO_DELETED.to_string(),
        todo,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ValidationKind;
    use crate::gateway::MemoryGateway;

    fn ok(value: Value) -> RequestBody {
        Ok(value)
    }

    #[tokio::test]
    async fn create_then_list() {
        let gateway = MemoryGateway::new();
        let todo = create(&gateway, ok(json!({ "text": " Buy groceries " })))
            .await
            .unwrap();
        assert_eq!(todo.text, "Buy groceries");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);

        assert_eq!(list(&gateway).await.unwrap(), vec![todo]);
    }

    #[tokio::test]
    async fn create_rejects_before_touching_the_store() {
        let gateway = MemoryGateway::new();
        gateway.set_offline(true);
        let error = create(&gateway, ok(json!({}))).await.unwrap_err();
        assert!(matches!(error, TodoError::Validation(_)));
    }

    #[tokio::test]
    async fn create_surfaces_unparseable_body() {
        let gateway = MemoryGateway::new();
        let error = create(&gateway, Err(ValidationError::malformed_body("eof")))
            .await
            .unwrap_err();
        match error {
            TodoError::Validation(validation) => {
                assert_eq!(validation.kind(), ValidationKind::MalformedBody)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_checks_id_before_body() {
        let gateway = MemoryGateway::new();
        let error = update(&gateway, "invalid-uuid", ok(json!({})))
            .await
            .unwrap_err();
        match error {
            TodoError::Validation(validation) => {
                assert_eq!(validation.kind(), ValidationKind::MalformedId)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let gateway = MemoryGateway::new();
        let created = create(&gateway, ok(json!({ "text": "Walk dog" })))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = update(&gateway, &created.id.to_string(), ok(json!({ "completed": true })))
            .await
            .unwrap();
        assert_eq!(updated.text, "Walk dog");
        assert!(updated.completed);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let gateway = MemoryGateway::new();
        let error = update(
            &gateway,
            "00000000-0000-0000-0000-000000000000",
            ok(json!({ "text": "x" })),
        )
        .await
        .unwrap_err();
        assert!(matches!(error, TodoError::NotFound));
    }

    #[tokio::test]
    async fn delete_twice_is_not_found_twice() {
        let gateway = MemoryGateway::new();
        let created = create(&gateway, ok(json!({ "text": "once" }))).await.unwrap();
        let id = created.id.to_string();

        let deleted = delete(&gateway, &id).await.unwrap();
        assert_eq!(deleted.message, TODO_DELETED);
        assert_eq!(deleted.todo, created);

        for _ in 0..2 {
            assert!(matches!(delete(&gateway, &id).await, Err(TodoError::NotFound)));
        }
    }

    #[tokio::test]
    async fn gateway_failures_are_unexpected() {
        let gateway = MemoryGateway::new();
        gateway.set_offline(true);
        assert!(matches!(list(&gateway).await, Err(TodoError::Unexpected(_))));
        assert!(matches!(
            delete(&gateway, "00000000-0000-0000-0000-000000000000").await,
            Err(TodoError::Unexpected(_))
        ));
    }
}
