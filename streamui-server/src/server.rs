//! HTTP transport: one SSE endpoint per protocol variant.
//!
//! `POST /api/agui` and `POST /api/a2ui` accept a [`RunRequest`] and answer
//! with `text/event-stream`, one `data: <json>\n\n` frame per event.
//! `GET /health` is a liveness probe.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use streamui_core::{encode_frame, Event, RunRequest, Variant};
use streamui_models::BoxedModel;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::session::{SessionConfig, StreamSession};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Completion provider.
    pub model: BoxedModel,
    /// Settings applied to every run.
    pub session: SessionConfig,
}

impl AppState {
    /// Create handler state.
    pub fn new(model: BoxedModel, session: SessionConfig) -> Self {
        Self { model, session }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(Variant::Catalog.path(), post(run_catalog))
        .route(Variant::Declarative.path(), post(run_declarative))
        .route("/health", get(health_check))
        .with_state(Arc::new(state))
}

/// Bind `config.addr()` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, model: BoxedModel) -> ServerResult<()> {
    let addr = config.addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, model = %model.identifier(), "Listening");

    serve_on(listener, AppState::new(model, config.session_config())).await
}

/// Serve on an already bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, state: AppState) -> ServerResult<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .map_err(ServerError::Serve)
}

/// POST /api/agui - Run the fixed-catalog variant
async fn run_catalog(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Response {
    start_run(&state, Variant::Catalog, request)
}

/// POST /api/a2ui - Run the declarative variant
async fn run_declarative(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Response {
    start_run(&state, Variant::Declarative, request)
}

/// GET /health - Liveness probe
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn start_run(state: &AppState, variant: Variant, request: RunRequest) -> Response {
    let session = StreamSession::new(state.model.clone(), variant, state.session.clone());
    sse_response(session.spawn(request))
}

/// Stream events from `rx` as SSE frames, in order, until the sender is gone.
pub fn sse_response(rx: mpsc::Receiver<Event>) -> Response {
    let frames = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok::<_, Infallible>(encode_frame(&event)), rx))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(frames));

    match response {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Failed to build SSE response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
