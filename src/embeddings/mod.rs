// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CLIP embedding models
//!
//! The HTTP layer only sees the [`ClipEncoder`] trait; the ONNX Runtime
//! implementation lives in [`onnx_model`] and is loaded once at startup by
//! [`model_manager`].

use anyhow::Result;
use image::DynamicImage;

pub mod model_manager;
pub mod onnx_model;

pub use model_manager::{
    load_clip_model, resolve_model_files, ClipModelConfig, ClipModelFiles, ModelSource,
    DEFAULT_MODEL_REPO,
};
pub use onnx_model::ClipOnnxModel;

/// A pretrained encoder mapping images and text into one vector space
///
/// Implementations are read-only after construction and shared across
/// requests, so every method takes `&self`. Calls are blocking and may be
/// CPU-heavy; async callers should run them on a blocking thread.
#[cfg_attr(test, mockall::automock)]
pub trait ClipEncoder: Send + Sync {
    /// Projected image features for an already decoded image
    fn image_features(&self, image: &DynamicImage) -> Result<Vec<f32>>;

    /// Projected text features for a single string
    fn text_features(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this encoder returns
    fn dimension(&self) -> usize;

    /// Model identifier reported by the health endpoint
    fn model_name(&self) -> String;
}
