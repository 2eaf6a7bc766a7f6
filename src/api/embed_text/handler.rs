// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed_text/ HTTP handler

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use super::request::EmbedTextRequest;
use crate::api::http_server::{blocking_inference, AppState};
use crate::api::response::{EmbeddingResponse, MissingTextResponse};
use crate::api::ApiError;

/// POST /embed_text/ handler
///
/// # Request Body
/// ```json
/// { "text": "a photo of a cat" }
/// ```
///
/// # Response Body
/// ```json
/// { "embedding": [0.1, 0.2, ...] }
/// ```
///
/// A missing or empty `text` yields `{"error": "Text parameter is missing."}`
/// with status 200. The body is parsed as JSON whatever its `Content-Type`;
/// bodies that are not a JSON object are rejected with 400.
pub async fn embed_text_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: EmbedTextRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected embed_text body: {}", e);
        ApiError::InvalidRequest(format!("Invalid JSON body: {}", e))
    })?;

    let Some(text) = request.into_text() else {
        return Ok(Json(MissingTextResponse::default()).into_response());
    };

    info!("Received text: {}", text);

    let encoder = state.encoder.clone();
    let embedding = blocking_inference(move || encoder.text_features(&text)).await?;

    Ok(Json(EmbeddingResponse::from(embedding)).into_response())
}
