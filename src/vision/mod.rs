// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image handling for the CLIP vision tower
//!
//! This module provides:
//! - Decoding of uploaded bytes into raster images
//! - CLIP resize/crop/normalize preprocessing into NCHW tensors

pub mod image_utils;
pub mod preprocessing;

pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo, DEFAULT_MAX_IMAGE_SIZE};
pub use preprocessing::{preprocess_for_clip, CLIP_INPUT_SIZE};
