// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::embed_image::embed_image_handler;
use super::embed_text::embed_text_handler;
use super::response::HealthResponse;
use super::ApiError;
use crate::embeddings::ClipEncoder;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// State shared by every handler
///
/// The encoder is loaded once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub encoder: Arc<dyn ClipEncoder>,
    pub model_name: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(encoder: Arc<dyn ClipEncoder>, max_upload_bytes: usize) -> Self {
        let model_name = encoder.model_name();
        Self {
            encoder,
            model_name,
            max_upload_bytes,
        }
    }
}

/// Builds the router with all endpoints and middleware
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Embedding endpoints
        .route("/embed_image/", post(embed_image_handler))
        .route("/embed_text/", post(embed_text_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!("✅ API server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Runs an encoder call on the blocking pool
///
/// Inference is CPU-bound, so it must not run on the async workers.
pub(crate) async fn blocking_inference<F>(task: F) -> Result<Vec<f32>, ApiError>
where
    F: FnOnce() -> anyhow::Result<Vec<f32>> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| {
            error!("Inference task failed to complete: {}", e);
            ApiError::InternalError("Inference task failed".to_string())
        })?
        .map_err(|e| {
            error!("Embedding failed: {:#}", e);
            ApiError::InternalError(format!("Embedding failed: {}", e))
        })
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: crate::version::SERVICE_NAME.to_string(),
        version: crate::version::VERSION.to_string(),
        model: state.model_name.clone(),
        dimension: state.encoder.dimension(),
        endpoints: crate::version::ENDPOINTS
            .iter()
            .map(|endpoint| endpoint.to_string())
            .collect(),
    })
}
