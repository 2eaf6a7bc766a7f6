// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text embedding endpoint (POST /embed_text/)

pub mod handler;
pub mod request;

pub use handler::embed_text_handler;
pub use request::EmbedTextRequest;
