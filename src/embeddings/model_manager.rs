// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CLIP Model Loading
//!
//! Resolves the ONNX files of a CLIP export either from a local directory or
//! by repository name from the HuggingFace Hub, then builds the
//! [`ClipOnnxModel`] once at startup.

use crate::embeddings::ClipOnnxModel;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Default hub repository: ONNX export of openai/clip-vit-base-patch32
pub const DEFAULT_MODEL_REPO: &str = "Xenova/clip-vit-base-patch32";

/// Vision tower path inside a model repository or directory
pub const VISION_MODEL_FILE: &str = "onnx/vision_model.onnx";
/// Text tower path inside a model repository or directory
pub const TEXT_MODEL_FILE: &str = "onnx/text_model.onnx";
/// Tokenizer path inside a model repository or directory
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Where the model files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Download (or reuse the cached copy) from the HuggingFace Hub
    Hub { repo: String },
    /// Use files already laid out in a local directory
    LocalDir(PathBuf),
}

/// Configuration for loading the CLIP model
#[derive(Debug, Clone)]
pub struct ClipModelConfig {
    /// Model name reported to clients
    pub name: String,
    /// Where to find the ONNX files
    pub source: ModelSource,
    /// ONNX Runtime intra-op threads per session
    pub intra_threads: usize,
}

/// Resolved on-disk paths of one CLIP export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipModelFiles {
    pub vision_model: PathBuf,
    pub text_model: PathBuf,
    pub tokenizer: PathBuf,
}

impl ClipModelFiles {
    /// Expected layout under a local model directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vision_model: dir.join(VISION_MODEL_FILE),
            text_model: dir.join(TEXT_MODEL_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
        }
    }

    /// Checks that every file exists
    pub fn validate(&self) -> Result<()> {
        if !self.vision_model.exists() {
            anyhow::bail!(
                "Vision model file not found: {}",
                self.vision_model.display()
            );
        }
        if !self.text_model.exists() {
            anyhow::bail!("Text model file not found: {}", self.text_model.display());
        }
        if !self.tokenizer.exists() {
            anyhow::bail!("Tokenizer file not found: {}", self.tokenizer.display());
        }
        Ok(())
    }
}

/// Resolves model files for a source
///
/// Hub downloads block on network I/O; call from a blocking context.
pub fn resolve_model_files(source: &ModelSource) -> Result<ClipModelFiles> {
    match source {
        ModelSource::LocalDir(dir) => {
            let files = ClipModelFiles::in_dir(dir);
            files.validate()?;
            Ok(files)
        }
        ModelSource::Hub { repo } => {
            info!("Fetching CLIP model files from HuggingFace Hub: {}", repo);
            let api = hf_hub::api::sync::Api::new()
                .context("Failed to initialise HuggingFace Hub client")?;
            let repo_handle = api.model(repo.clone());

            let fetch = |file: &str| -> Result<PathBuf> {
                repo_handle
                    .get(file)
                    .context(format!("Failed to fetch {} from {}", file, repo))
            };

            Ok(ClipModelFiles {
                vision_model: fetch(VISION_MODEL_FILE)?,
                text_model: fetch(TEXT_MODEL_FILE)?,
                tokenizer: fetch(TOKENIZER_FILE)?,
            })
        }
    }
}

/// Loads the CLIP model described by `config`
///
/// File resolution and session construction run on a blocking thread.
///
/// # Example
/// ```ignore
/// let model = load_clip_model(ClipModelConfig {
///     name: DEFAULT_MODEL_REPO.to_string(),
///     source: ModelSource::Hub { repo: DEFAULT_MODEL_REPO.to_string() },
///     intra_threads: 4,
/// }).await?;
/// ```
pub async fn load_clip_model(config: ClipModelConfig) -> Result<Arc<ClipOnnxModel>> {
    let model_name = config.name.clone();
    info!("Loading CLIP model: {}", model_name);

    let result = tokio::task::spawn_blocking(move || {
        let files = resolve_model_files(&config.source)?;
        ClipOnnxModel::new(config.name, &files, config.intra_threads)
    })
    .await
    .context("Model loading task failed")?;

    match result {
        Ok(model) => Ok(Arc::new(model)),
        Err(e) => {
            error!("✗ Failed to load model {}: {}", model_name, e);
            Err(e)
        }
    }
}
