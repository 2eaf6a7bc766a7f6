// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the CLIP vision tower

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Input resolution of the CLIP ViT-B/32 vision encoder
pub const CLIP_INPUT_SIZE: u32 = 224;

/// CLIP normalization mean values (OpenAI pretraining statistics)
pub const CLIP_MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];

/// CLIP normalization std values
pub const CLIP_STD: [f32; 3] = [0.26862954, 0.26130258, 0.27577711];

/// Preprocess an image for the CLIP vision encoder
///
/// Steps:
/// 1. Take the centered square whose side is the shorter edge
/// 2. Resize that square to CLIP_INPUT_SIZE x CLIP_INPUT_SIZE (bicubic)
/// 3. Convert to RGB
/// 4. Normalize with CLIP mean/std: (pixel/255 - mean) / std
/// 5. Convert to NCHW tensor format [1, 3, H, W]
///
/// Memory use is bounded by the output size for any aspect ratio.
pub fn preprocess_for_clip(image: &DynamicImage) -> Array4<f32> {
    let square = center_square(image);
    let resized = square.resize_exact(CLIP_INPUT_SIZE, CLIP_INPUT_SIZE, FilterType::CatmullRom);
    let rgb = resized.to_rgb8();

    let size = CLIP_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - CLIP_MEAN[c]) / CLIP_STD[c];
        }
    }

    tensor
}

/// Crop the centered square whose side equals the shorter edge
///
/// The crop always lies inside the image. An empty image becomes a single
/// mid-gray pixel.
pub fn center_square(image: &DynamicImage) -> DynamicImage {
    let (w, h) = image.dimensions();

    if w == 0 || h == 0 {
        return DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([128, 128, 128])));
    }

    let side = w.min(h);
    if w == h {
        return image.clone();
    }

    image.crop_imm((w - side) / 2, (h - side) / 2, side, side)
}
