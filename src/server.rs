//! HTTP JSON API consumed by the chat front end.
//!
//! Provides [`router`] (the axum route table, usable without a socket) and
//! [`serve`], which binds it and runs until Ctrl-C.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{IrisConfig, Secrets};
use crate::conversation::{Exchange, SessionLimits, SessionStore, HISTORY_VIEW_LEN};
use crate::oracle::{Oracle, QueryResult, SystemStatus};

#[derive(Clone)]
pub struct AppState {
    pub oracle: Arc<Oracle>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(oracle: Oracle) -> Self {
        Self::with_limits(oracle, SessionLimits::default())
    }

    pub fn with_limits(oracle: Oracle, limits: SessionLimits) -> Self {
        Self {
            oracle: Arc::new(oracle),
            sessions: Arc::new(SessionStore::with_limits(limits)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub result: QueryResult,
    pub session_id: Uuid,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/status", get(status))
        .route("/api/sessions/{id}/history", get(history))
        .route("/api/sessions/{id}", delete(end_session))
        .with_state(state)
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let (session_id, memory) = state.sessions.open(request.session_id).await;
    let mut memory = memory.lock().await;

    tracing::info!(
        session = %session_id,
        message_len = request.message.len(),
        "chat request"
    );

    let result = state.oracle.process(&mut memory, &request.message).await;

    tracing::info!(
        session = %session_id,
        classification = %result.classification,
        saved = result.saved,
        "chat reply"
    );

    Json(ChatResponse { result, session_id })
}

async fn status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(state.oracle.status())
}

async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Exchange>>, StatusCode> {
    let memory = state.sessions.get(&id).await.ok_or(StatusCode::NOT_FOUND)?;
    let memory = memory.lock().await;
    Ok(Json(memory.recent(HISTORY_VIEW_LEN).to_vec()))
}

async fn end_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.sessions.close(&id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Start the HTTP API on the configured host and port.
pub async fn serve(config: IrisConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let oracle = Oracle::from_config(&config, &Secrets::from_env());
    let limits = SessionLimits::from(&config.server);
    tracing::info!(
        max_sessions = limits.max_sessions,
        idle_secs = limits.idle_ttl.as_secs(),
        "session limits"
    );
    let app = router(AppState::with_limits(oracle, limits));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "IRIS listening at http://{bind_addr}/api");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
