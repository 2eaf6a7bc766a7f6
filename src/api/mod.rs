// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed_image;
pub mod embed_text;
pub mod errors;
pub mod http_server;
pub mod response;

pub use embed_image::embed_image_handler;
pub use embed_text::{embed_text_handler, EmbedTextRequest};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState};
pub use response::{EmbeddingResponse, HealthResponse, MissingTextResponse, MISSING_TEXT_MESSAGE};
