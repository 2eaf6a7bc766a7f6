// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CLIP model tests against the real ONNX export
//!
//! These need the clip-vit-base-patch32 ONNX files, either in the directory
//! named by CLIP_MODEL_DIR or fetched from the HuggingFace Hub. Run with:
//!
//! ```text
//! CLIP_MODEL_DIR=/workspace/models/clip-vit-base-patch32 cargo test -- --ignored
//! ```

use clip_embed_node::embeddings::{
    load_clip_model, ClipEncoder, ClipModelConfig, ClipOnnxModel, ModelSource,
    DEFAULT_MODEL_REPO,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::PathBuf;
use std::sync::Arc;

/// Projection width of ViT-B/32
const EXPECTED_DIMENSION: usize = 512;

async fn load_model() -> Arc<ClipOnnxModel> {
    let source = match std::env::var("CLIP_MODEL_DIR") {
        Ok(dir) => ModelSource::LocalDir(PathBuf::from(dir)),
        Err(_) => ModelSource::Hub {
            repo: DEFAULT_MODEL_REPO.to_string(),
        },
    };

    load_clip_model(ClipModelConfig {
        name: DEFAULT_MODEL_REPO.to_string(),
        source,
        intra_threads: 2,
    })
    .await
    .expect("Failed to load CLIP model")
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b)
}

fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

#[cfg(test)]
mod clip_model_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires CLIP ONNX model files"]
    async fn test_model_reports_projection_dimension() {
        let model = load_model().await;
        assert_eq!(model.dimension(), EXPECTED_DIMENSION);
        assert_eq!(model.model_name(), DEFAULT_MODEL_REPO);
    }

    #[tokio::test]
    #[ignore = "requires CLIP ONNX model files"]
    async fn test_image_dimension_independent_of_input_size() {
        let model = load_model().await;

        for (w, h) in [(1, 1), (224, 224), (640, 120), (50, 900)] {
            let embedding = model.image_features(&solid(w, h, [90, 140, 200])).unwrap();
            assert_eq!(embedding.len(), EXPECTED_DIMENSION, "{}x{}", w, h);
            assert!(embedding.iter().all(|v| v.is_finite()));
        }
    }

    #[tokio::test]
    #[ignore = "requires CLIP ONNX model files"]
    async fn test_text_embedding_is_deterministic() {
        let model = load_model().await;

        let first = model.text_features("a photo of a cat").unwrap();
        let second = model.text_features("a photo of a cat").unwrap();

        assert_eq!(first.len(), EXPECTED_DIMENSION);
        assert_eq!(first, second, "same text must give bit-identical output");
    }

    #[tokio::test]
    #[ignore = "requires CLIP ONNX model files"]
    async fn test_image_embedding_is_deterministic() {
        let model = load_model().await;
        let image = solid(300, 200, [40, 160, 90]);

        let first = model.image_features(&image).unwrap();
        let second = model.image_features(&image).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    #[ignore = "requires CLIP ONNX model files"]
    async fn test_different_texts_differ() {
        let model = load_model().await;

        let cat = model.text_features("a photo of a cat").unwrap();
        let airplane = model.text_features("a photo of an airplane").unwrap();

        assert_ne!(cat, airplane);
    }

    #[tokio::test]
    #[ignore = "requires CLIP ONNX model files"]
    async fn test_text_longer_than_context_is_truncated() {
        let model = load_model().await;

        let long = "the quick brown fox jumps over the lazy dog ".repeat(40);
        let embedding = model.text_features(&long).unwrap();

        assert_eq!(embedding.len(), EXPECTED_DIMENSION);
    }

    #[tokio::test]
    #[ignore = "requires CLIP ONNX model files"]
    async fn test_text_and_image_share_space() {
        let model = load_model().await;

        let red = model.image_features(&solid(224, 224, [230, 20, 20])).unwrap();
        let red_text = model.text_features("a solid red square").unwrap();
        let blue_text = model.text_features("a solid blue square").unwrap();

        assert_eq!(red.len(), red_text.len());
        assert!(
            cosine(&red, &red_text) > cosine(&red, &blue_text),
            "red image should sit closer to the red caption"
        );
    }
}
