// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use clip_embed_node::{
    api::{start_server, AppState},
    config::NodeConfig,
    embeddings::load_clip_model,
    version,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clip_embed_node=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NodeConfig::parse();
    config.validate()?;
    let addr = config.listen_addr()?;

    info!("🚀 Starting {} v{}", version::SERVICE_NAME, version::VERSION);
    info!("📦 Model: {}", config.model_repo);
    if let Some(dir) = &config.model_dir {
        info!("📁 Model directory: {}", dir.display());
    }

    // Model load failure is fatal
    let model = match load_clip_model(config.model_config()).await {
        Ok(model) => model,
        Err(e) => {
            error!("❌ Failed to load CLIP model: {:#}", e);
            error!("Set CLIP_MODEL_DIR to a directory containing:");
            error!("  - onnx/vision_model.onnx");
            error!("  - onnx/text_model.onnx");
            error!("  - tokenizer.json");
            error!("or CLIP_MODEL_REPO to a HuggingFace repository with the same layout");
            return Err(e);
        }
    };

    let state = AppState::new(model, config.max_upload_bytes);
    start_server(addr, state).await
}
