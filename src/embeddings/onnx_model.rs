// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX CLIP Model Wrapper
//!
//! This module wraps ONNX Runtime to run the two towers of a CLIP model
//! exported to ONNX (e.g. Xenova/clip-vit-base-patch32):
//!
//! - `vision_model.onnx`: `pixel_values [1, 3, 224, 224]` -> `image_embeds [1, D]`
//! - `text_model.onnx`: `input_ids [1, T]` (+ optional `attention_mask`) -> `text_embeds [1, D]`
//!
//! Outputs are the projected features, not L2-normalized, so they match
//! `get_image_features` / `get_text_features` of the reference model.

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::{Array2, ArrayViewD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

use super::model_manager::ClipModelFiles;
use super::ClipEncoder;
use crate::vision::preprocess_for_clip;

/// Maximum number of text tokens (including start/end) CLIP accepts
pub const CLIP_CONTEXT_LENGTH: usize = 77;

/// Projection output of the vision graph
const IMAGE_EMBEDS_OUTPUT: &str = "image_embeds";
/// Projection output of the text graph
const TEXT_EMBEDS_OUTPUT: &str = "text_embeds";

/// ONNX CLIP model with separate vision and text sessions
///
/// # Thread Safety
/// Sessions sit behind `Arc<Mutex>` because ONNX Runtime needs exclusive
/// access per run; the tokenizer is immutable and shared.
#[derive(Clone)]
pub struct ClipOnnxModel {
    /// Vision tower session
    vision_session: Arc<Mutex<Session>>,

    /// Text tower session
    text_session: Arc<Mutex<Session>>,

    /// CLIP BPE tokenizer, truncating to CLIP_CONTEXT_LENGTH
    tokenizer: Arc<Tokenizer>,

    /// Whether the exported text graph declares an `attention_mask` input
    text_takes_mask: bool,

    /// Output holding the projected image features
    image_output: String,

    /// Output holding the projected text features
    text_output: String,

    /// Model name (e.g., "Xenova/clip-vit-base-patch32")
    model_name: String,

    /// Output dimension, probed at load time (512 for ViT-B/32)
    dimension: usize,
}

impl std::fmt::Debug for ClipOnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipOnnxModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("text_takes_mask", &self.text_takes_mask)
            .field("image_output", &self.image_output)
            .field("text_output", &self.text_output)
            .finish_non_exhaustive()
    }
}

impl ClipOnnxModel {
    /// Loads both towers and the tokenizer, then probes the output dimension
    ///
    /// # Errors
    /// Returns error if:
    /// - Any model file is missing or invalid
    /// - ONNX Runtime initialization fails
    /// - The two towers disagree on the embedding dimension
    ///
    /// # Example
    /// ```ignore
    /// let files = ClipModelFiles::in_dir("./models/clip-vit-base-patch32");
    /// let model = ClipOnnxModel::new("clip-vit-base-patch32", &files, 4)?;
    /// assert_eq!(model.dimension(), 512);
    /// ```
    pub fn new(
        model_name: impl Into<String>,
        files: &ClipModelFiles,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();
        files.validate()?;

        info!("Initializing CLIP vision tower from {}", files.vision_model.display());
        let vision_session = build_session(&files.vision_model, intra_threads)?;

        info!("Initializing CLIP text tower from {}", files.text_model.display());
        let text_session = build_session(&files.text_model, intra_threads)?;

        let text_takes_mask = text_session
            .inputs
            .iter()
            .any(|input| input.name == "attention_mask");

        let image_output = projection_output(
            vision_session.outputs.iter().map(|o| o.name.as_str()),
            IMAGE_EMBEDS_OUTPUT,
        )
        .context("Vision model declares no outputs")?;
        let text_output = projection_output(
            text_session.outputs.iter().map(|o| o.name.as_str()),
            TEXT_EMBEDS_OUTPUT,
        )
        .context("Text model declares no outputs")?;
        debug!(
            "Projection outputs: image={}, text={}",
            image_output, text_output
        );

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: CLIP_CONTEXT_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure tokenizer truncation: {}", e))?;
        tokenizer.with_padding(None);

        let mut model = Self {
            vision_session: Arc::new(Mutex::new(vision_session)),
            text_session: Arc::new(Mutex::new(text_session)),
            tokenizer: Arc::new(tokenizer),
            text_takes_mask,
            image_output,
            text_output,
            model_name,
            dimension: 0,
        };

        model.dimension = model.probe_dimension()?;

        info!(
            "✅ CLIP model {} loaded ({} dimensions)",
            model.model_name, model.dimension
        );

        Ok(model)
    }

    /// Runs one inference per tower and checks both agree on the width
    fn probe_dimension(&self) -> Result<usize> {
        let text_dim = self
            .embed_text_unchecked("validation test")
            .context("Text tower validation failed")?
            .len();

        let probe = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            crate::vision::CLIP_INPUT_SIZE,
            crate::vision::CLIP_INPUT_SIZE,
            Rgb([128, 128, 128]),
        ));
        let image_dim = self
            .embed_image_unchecked(&probe)
            .context("Vision tower validation failed")?
            .len();

        if text_dim == 0 || text_dim != image_dim {
            anyhow::bail!(
                "Model towers disagree on embedding dimension: text {} vs image {}",
                text_dim,
                image_dim
            );
        }

        Ok(text_dim)
    }

    fn embed_image_unchecked(&self, image: &DynamicImage) -> Result<Vec<f32>> {
        let pixel_values = preprocess_for_clip(image);

        let mut session_guard = self
            .vision_session
            .lock()
            .map_err(|_| anyhow!("Vision session lock poisoned"))?;
        let outputs = session_guard.run(ort::inputs![
            "pixel_values" => Value::from_array(pixel_values)?
        ])?;

        let output_array = outputs[self.image_output.as_str()]
            .try_extract_array::<f32>()
            .context(format!("Failed to extract {} tensor", self.image_output))?;

        flatten_projection(output_array)
    }

    fn embed_text_unchecked(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let seq_len = input_ids.len();
        debug!("Tokenized text into {} tokens", seq_len);

        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .context("Failed to create input_ids array")?;

        let mut session_guard = self
            .text_session
            .lock()
            .map_err(|_| anyhow!("Text session lock poisoned"))?;

        let outputs = if self.text_takes_mask {
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask)
                .context("Failed to create attention_mask array")?;

            session_guard.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids_array)?,
                "attention_mask" => Value::from_array(attention_mask_array)?
            ])?
        } else {
            session_guard.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids_array)?
            ])?
        };

        let output_array = outputs[self.text_output.as_str()]
            .try_extract_array::<f32>()
            .context(format!("Failed to extract {} tensor", self.text_output))?;

        flatten_projection(output_array)
    }

    fn check_dimension(&self, embedding: Vec<f32>) -> Result<Vec<f32>> {
        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }
        Ok(embedding)
    }
}

impl ClipEncoder for ClipOnnxModel {
    fn image_features(&self, image: &DynamicImage) -> Result<Vec<f32>> {
        let embedding = self.embed_image_unchecked(image)?;
        self.check_dimension(embedding)
    }

    fn text_features(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.embed_text_unchecked(text)?;
        self.check_dimension(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> String {
        self.model_name.clone()
    }
}

fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load ONNX model from {}",
            model_path.display()
        ))
}

/// Picks the projection output by name, falling back to the first output
///
/// A fallback output that is not `[1, D]` fails the load-time dimension probe.
fn projection_output<'a>(
    mut names: impl Iterator<Item = &'a str> + Clone,
    preferred: &str,
) -> Option<String> {
    if names.clone().any(|name| name == preferred) {
        return Some(preferred.to_string());
    }
    let first = names.next()?;
    warn!(
        "Model has no {} output, using first output {}",
        preferred, first
    );
    Some(first.to_string())
}

/// Turns a `[1, D]` projection output into a flat vector
fn flatten_projection(output: ArrayViewD<'_, f32>) -> Result<Vec<f32>> {
    let shape = output.shape();
    if shape.len() != 2 || shape[0] != 1 {
        anyhow::bail!(
            "Model outputs unexpected shape: {:?} (expected [1, dim])",
            shape
        );
    }
    Ok(output.iter().copied().collect())
}
