// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response bodies shared by the embedding endpoints

use serde::{Deserialize, Serialize};

/// Message returned when `/embed_text/` receives no usable text
pub const MISSING_TEXT_MESSAGE: &str = "Text parameter is missing.";

/// Successful embedding response
///
/// ```json
/// { "embedding": [0.1, -0.2, ...] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
}

impl From<Vec<f32>> for EmbeddingResponse {
    fn from(embedding: Vec<f32>) -> Self {
        Self { embedding }
    }
}

/// Payload for a text request without text
///
/// Sent with a 200 status; clients tell it apart from an embedding by the
/// `error` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissingTextResponse {
    pub error: String,
}

impl Default for MissingTextResponse {
    fn default() -> Self {
        Self {
            error: MISSING_TEXT_MESSAGE.to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model: String,
    pub dimension: usize,
    pub endpoints: Vec<String>,
}
