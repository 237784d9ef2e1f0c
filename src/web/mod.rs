//! Browser front-end: an axum router serving the résumé and scholarship
//! forms.
//!
//! | Route                   | Purpose                                  |
//! |-------------------------|------------------------------------------|
//! | `GET /`                 | index                                    |
//! | `GET /resume`           | résumé form                              |
//! | `POST /resume/analyze`  | matching analysis, rendered in the form  |
//! | `POST /resume/optimize` | `CV_Optimise.pdf` download               |
//! | `GET /scholarship`      | application form plus leaderboard        |
//! | `POST /scholarship`     | evaluate, record, re-render              |
//! | `GET /healthz`          | liveness probe                           |

pub mod handlers;
pub mod views;

use crate::config::ServerConfig;
use crate::error::AtsError;
use crate::workflow::Pipeline;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/resume", get(handlers::resume_form))
        .route("/resume/analyze", post(handlers::resume_analyze))
        .route("/resume/optimize", post(handlers::resume_optimize))
        .route(
            "/scholarship",
            get(handlers::scholarship_page).post(handlers::scholarship_submit),
        )
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(pipeline: Pipeline, server: ServerConfig) -> Result<(), AtsError> {
    let addr = server.socket_addr()?;
    let app = build_router(AppState::new(pipeline), &server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AtsError::Internal(format!("cannot bind {addr}: {e}")))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AtsError::Internal(format!("server error: {e}")))
}
