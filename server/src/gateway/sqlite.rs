use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use super::{GatewayError, TodoGateway};
use crate::model::{now, Todo, TodoPatch};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (
    id TEXT PRIMARY KEY NOT NULL,
    text TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const SELECT_ALL: &str =
    "SELECT id, text, completed, created_at, updated_at FROM todos ORDER BY rowid";

const INSERT: &str = "INSERT INTO todos (id, text, completed, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    RETURNING id, text, completed, created_at, updated_at";

const UPDATE_BY_ID: &str = "UPDATE todos
    SET text = COALESCE(?1, text),
        completed = COALESCE(?2, completed),
        updated_at = MAX(?3, created_at)
    WHERE id = ?4
    RETURNING id, text, completed, created_at, updated_at";

const DELETE_BY_ID: &str = "DELETE FROM todos WHERE id = ?1
    RETURNING id, text, completed, created_at, updated_at";

/// Relational store backed by a single SQLite table.
#[derive(Clone, Debug)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    /// Open (creating if needed) the database at `url` and ensure the
    /// `todos` table exists.
    ///
    /// An in-memory database lives only as long as its connection, so
    /// `:memory:` URLs get exactly one connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new();
        if url.contains(":memory:") || url.contains("mode=memory") {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        tracing::debug!(url, "sqlite schema ready");
        Ok(Self { pool })
    }

    /// Close the pool. Every later call fails.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl TodoGateway for SqliteGateway {
    async fn select_all(&self) -> Result<Vec<Todo>, GatewayError> {
        sqlx::query_as::<_, TodoRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Todo::try_from)
            .collect()
    }

    async fn insert(&self, text: String) -> Result<Todo, GatewayError> {
        let todo = Todo::new(text, now());
        let row = sqlx::query_as::<_, TodoRow>(INSERT)
            .bind(todo.id.hyphenated().to_string())
            .bind(&todo.text)
            .bind(todo.completed)
            .bind(encode_timestamp(todo.created_at))
            .bind(encode_timestamp(todo.updated_at))
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn update_by_id(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, GatewayError> {
        sqlx::query_as::<_, TodoRow>(UPDATE_BY_ID)
            .bind(patch.update.text())
            .bind(patch.update.completed())
            .bind(encode_timestamp(patch.updated_at))
            .bind(id.hyphenated().to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Todo::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Todo>, GatewayError> {
        sqlx::query_as::<_, TodoRow>(DELETE_BY_ID)
            .bind(id.hyphenated().to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Todo::try_from)
            .transpose()
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// A `todos` row as SQLite stores it.
#[derive(sqlx::FromRow)]
struct TodoRow {
    id: String,
    text: String,
    completed: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TodoRow> for Todo {
    type Error = GatewayError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| GatewayError::CorruptRow(format!("id `{}`: {e}", row.id)))?;
        Ok(Todo {
            id,
            text: row.text,
            completed: row.completed,
            created_at: decode_timestamp(&row.created_at)?,
            updated_at: decode_timestamp(&row.updated_at)?,
        })
    }
}

fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, GatewayError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| GatewayError::CorruptRow(format!("timestamp `{raw}`: {e}")))
}
