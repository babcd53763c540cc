//! HTTP surface: routes, shared state and the middleware stack.

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, Method, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, Environment};
use crate::error::{ErrorClassifier, ErrorResponse, TodoError, ValidationError};
use crate::gateway::TodoGateway;
use crate::model::Todo;
use crate::pipeline::{self, DeletedTodo, RequestBody};

/// Per-router state. Holds no mutable data of its own; the gateway owns
/// everything that changes.
pub struct AppState<G> {
    gateway: Arc<G>,
    classifier: ErrorClassifier,
    environment: Environment,
    started_at: Instant,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            classifier: self.classifier,
            environment: self.environment,
            started_at: self.started_at,
        }
    }
}

impl<G: TodoGateway> AppState<G> {
    pub fn new(gateway: G, environment: Environment) -> Self {
        Self {
            gateway: Arc::new(gateway),
            classifier: ErrorClassifier::new(!environment.is_production()),
            environment,
            started_at: Instant::now(),
        }
    }
}

/// Body of a healthy `/health` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the state was built.
    pub uptime: f64,
    pub environment: String,
}

/// Routes only, no middleware. Tests drive this directly.
pub fn app<G: TodoGateway>(state: AppState<G>) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos::<G>).post(create_todo::<G>))
        .route(
            "/api/todos/{id}",
            put(update_todo::<G>).delete(delete_todo::<G>),
        )
        .route("/health", get(health::<G>))
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .with_state(state)
}

/// Request tracing and CORS for a browser client served from `cors_origin`.
pub fn with_middleware(router: Router, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);
    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// A segment the router matched but could not decode is still a malformed id.
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<String, TodoError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!(%rejection, "undecodable id segment");
        ValidationError::malformed_id().into()
    })
}

fn request_body(body: Result<Json<Value>, JsonRejection>) -> RequestBody {
    body.map(|Json(value)| value)
        .map_err(|rejection| ValidationError::malformed_body(rejection.body_text()))
}

async fn list_todos<G: TodoGateway>(
    State(state): State<AppState<G>>,
) -> Result<Json<Vec<Todo>>, ErrorResponse> {
    pipeline::list(state.gateway.as_ref())
        .await
        .map(Json)
        .map_err(|e| state.classifier.classify(&e))
}

async fn create_todo<G: TodoGateway>(
    State(state): State<AppState<G>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ErrorResponse> {
    pipeline::create(state.gateway.as_ref(), request_body(body))
        .await
        .map(|todo| (StatusCode::CREATED, Json(todo)))
        .map_err(|e| state.classifier.classify(&e))
}

async fn update_todo<G: TodoGateway>(
    State(state): State<AppState<G>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Todo>, ErrorResponse> {
    let id = path_id(path).map_err(|e| state.classifier.classify(&e))?;
    pipeline::update(state.gateway.as_ref(), &id, request_body(body))
        .await
        .map(Json)
        .map_err(|e| state.classifier.classify(&e))
}

async fn delete_todo<G: TodoGateway>(
    State(state): State<AppState<G>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeletedTodo>, ErrorResponse> {
    let id = path_id(path).map_err(|e| state.classifier.classify(&e))?;
    pipeline::delete(state.gateway.as_ref(), &id)
        .await
        .map(Json)
        .map_err(|e| state.classifier.classify(&e))
}

async fn health<G: TodoGateway>(
    State(state): State<AppState<G>>,
) -> Result<Json<HealthStatus>, ErrorResponse> {
    if let Err(e) = state.gateway.ping().await {
        tracing::error!(error = %e, "health check failed");
        return Err(ErrorResponse::service_unavailable());
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.environment.to_string(),
    }))
}

async fn route_not_found() -> ErrorResponse {
    ErrorResponse::route_not_found()
}
