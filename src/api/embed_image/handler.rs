// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embed image endpoint handler

use axum::{body::Bytes, extract::State, Json};
use axum_extra::extract::{multipart::MultipartRejection, Multipart};
use tracing::{debug, warn};

use crate::api::http_server::{blocking_inference, AppState};
use crate::api::response::EmbeddingResponse;
use crate::api::ApiError;
use crate::vision::decode_image_bytes;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// POST /embed_image/ - Embed an uploaded image
///
/// # Request
/// `multipart/form-data` with the image bytes in the `file` field.
///
/// # Response
/// `{"embedding": [0.1, 0.2, ...]}`
///
/// # Errors
/// - 400 Bad Request: body is not valid multipart
/// - 422 Unprocessable Entity: no `file` field
/// - 500 Internal Server Error: bytes are not a decodable image, or inference failed
pub async fn embed_image_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EmbeddingResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected embed_image body: {}", e);
        ApiError::InvalidRequest(e.to_string())
    })?;

    let bytes = read_file_field(&mut multipart).await?;

    let (image, image_info) = decode_image_bytes(&bytes, state.max_upload_bytes).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        ApiError::InvalidImage(e.to_string())
    })?;

    debug!(
        "Decoded image: {}x{} {:?}, {} bytes",
        image_info.width, image_info.height, image_info.format, image_info.size_bytes
    );

    let encoder = state.encoder.clone();
    let embedding = blocking_inference(move || encoder.image_features(&image)).await?;

    Ok(Json(EmbeddingResponse::from(embedding)))
}

/// Reads the bytes of the first `file` field, skipping any others
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)));
        }
    }

    Err(ApiError::MissingField(FILE_FIELD.to_string()))
}
