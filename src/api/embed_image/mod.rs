// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image embedding endpoint (POST /embed_image/)

pub mod handler;

pub use handler::{embed_image_handler, FILE_FIELD};
