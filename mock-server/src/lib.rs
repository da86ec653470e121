//! In-memory stand-in for the remote API.
//!
//! Every route under `/v1` requires `Authorization: Bearer <secret>`. Errors
//! raised by the handlers use the API's JSON error object; errors raised by
//! axum's extractors (bad UUID, malformed JSON) stay plain text, which is
//! what a client sees from a misbehaving upstream.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub query: String,
    pub answer: String,
}

#[derive(Deserialize)]
pub struct CreateMessage {
    pub query: String,
}

#[derive(Deserialize)]
pub struct RenameMessage {
    pub query: Option<String>,
}

/// Body of every structured error the server returns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub status: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<Message>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Message>>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    secret: Arc<str>,
}

pub fn app(secret: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        secret: Arc::from(secret),
    };
    Router::new()
        .route("/v1/messages", get(list_messages).post(create_message))
        .route(
            "/v1/messages/{id}",
            get(get_message).patch(rename_message).delete(delete_message),
        )
        .route("/v1/status/{code}", get(plain_status))
        .route("/v1/malformed", get(malformed))
        .route("/v1/large", get(large))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, secret: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(secret)).await
}

fn api_error(status: StatusCode, code: &str, message: &str) -> Response {
    let body = ErrorBody {
        code: code.to_string(),
        message: message.to_string(),
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    api_error(StatusCode::NOT_FOUND, "not_found", "Message Not Exists.")
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == &*state.secret);
    if !authorized {
        debug!(uri = %request.uri(), "rejecting request without valid bearer token");
        return api_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Access token is invalid",
        );
    }
    next.run(request).await
}

async fn list_messages(State(state): State<AppState>) -> Json<MessageList> {
    let messages = state.db.read().await;
    Json(MessageList {
        data: messages.values().cloned().collect(),
    })
}

async fn create_message(
    State(state): State<AppState>,
    Json(input): Json<CreateMessage>,
) -> Response {
    if input.query.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "invalid_param", "query is required");
    }
    let message = Message {
        id: Uuid::new_v4(),
        answer: format!("echo: {}", input.query),
        query: input.query,
    };
    info!(id = %message.id, "created message");
    state.db.write().await.insert(message.id, message.clone());
    (StatusCode::CREATED, Json(message)).into_response()
}

async fn get_message(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.db.read().await.get(&id) {
        Some(message) => Json(message.clone()).into_response(),
        None => not_found(),
    }
}

async fn rename_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<RenameMessage>,
) -> Response {
    let mut messages = state.db.write().await;
    let Some(message) = messages.get_mut(&id) else {
        return not_found();
    };
    if let Some(query) = input.query {
        message.query = query;
    }
    Json(message.clone()).into_response()
}

async fn delete_message(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.db.write().await.remove(&id) {
        Some(_) => {
            info!(%id, "deleted message");
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(),
    }
}

/// Answers with the requested status and a plain-text reason.
async fn plain_status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    let reason = status.canonical_reason().unwrap_or("Unknown");
    (status, reason.to_string()).into_response()
}

/// Length of the JSON string served by `/v1/large`; over 10 MiB.
pub const LARGE_BODY_CHARS: usize = 11 * 1024 * 1024;

async fn large() -> Json<String> {
    Json("a".repeat(LARGE_BODY_CHARS))
}

async fn malformed() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        "{\"data\": [",
    )
        .into_response()
}
