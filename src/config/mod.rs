// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration from command-line flags and environment variables

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::embeddings::{ClipModelConfig, ModelSource, DEFAULT_MODEL_REPO};
use crate::vision::DEFAULT_MAX_IMAGE_SIZE;

/// CLIP embedding node
#[derive(Parser, Debug, Clone)]
#[command(name = "clip-embed-node")]
#[command(version)]
#[command(about = "Serve CLIP image and text embeddings over HTTP", long_about = None)]
pub struct NodeConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// HuggingFace Hub repository holding the ONNX CLIP export
    #[arg(long, env = "CLIP_MODEL_REPO", default_value = DEFAULT_MODEL_REPO)]
    pub model_repo: String,

    /// Local directory with the model files; skips the hub when set
    #[arg(long, env = "CLIP_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// ONNX Runtime intra-op threads per session
    #[arg(long, env = "ONNX_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Largest accepted upload in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_IMAGE_SIZE)]
    pub max_upload_bytes: usize,
}

impl NodeConfig {
    /// Rejects settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("API_PORT must be greater than 0");
        }
        if self.intra_threads == 0 {
            anyhow::bail!("ONNX_INTRA_THREADS must be greater than 0");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be greater than 0");
        }
        if self.model_dir.is_none() && self.model_repo.trim().is_empty() {
            anyhow::bail!("CLIP_MODEL_REPO cannot be empty when CLIP_MODEL_DIR is unset");
        }
        Ok(())
    }

    /// Socket address the server listens on
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context(format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// Model loading settings derived from this configuration
    pub fn model_config(&self) -> ClipModelConfig {
        let source = match &self.model_dir {
            Some(dir) => ModelSource::LocalDir(dir.clone()),
            None => ModelSource::Hub {
                repo: self.model_repo.clone(),
            },
        };

        ClipModelConfig {
            name: self.model_repo.clone(),
            source,
            intra_threads: self.intra_threads,
        }
    }
}
