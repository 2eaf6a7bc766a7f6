// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed_image/ tests
//!
//! Uploads generated images through the router and checks that any decodable
//! format yields a fixed-length embedding while non-image bytes never do.

use super::support::*;
use axum::{body::to_bytes, http::StatusCode};
use image::ImageFormat;
use tower::ServiceExt;

#[tokio::test]
async fn test_png_upload_returns_embedding() {
    let bytes = encode(&solid_image(32, 32, [200, 30, 30]), ImageFormat::Png);
    let response = test_app()
        .oneshot(multipart_upload("file", "red.png", &bytes))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(embedding_of(&body).len(), TEST_DIMENSION);
}

#[tokio::test]
async fn test_dimension_is_constant_across_formats_and_sizes() {
    let cases = [
        (solid_image(10, 300, [0, 0, 0]), ImageFormat::Png),
        (solid_image(640, 480, [12, 200, 40]), ImageFormat::Jpeg),
        (solid_image(1, 1, [255, 255, 255]), ImageFormat::Bmp),
    ];

    for (image, format) in cases {
        let bytes = encode(&image, format);
        let response = test_app()
            .oneshot(multipart_upload("file", "upload", &bytes))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "format {:?}", format);
        let body = read_json(response).await;
        assert_eq!(embedding_of(&body).len(), TEST_DIMENSION);
    }
}

#[tokio::test]
async fn test_same_image_gives_same_embedding() {
    let bytes = encode(&solid_image(64, 48, [10, 120, 220]), ImageFormat::Png);

    let first = read_json(
        test_app()
            .oneshot(multipart_upload("file", "a.png", &bytes))
            .await
            .unwrap(),
    )
    .await;
    let second = read_json(
        test_app()
            .oneshot(multipart_upload("file", "b.png", &bytes))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(embedding_of(&first), embedding_of(&second));
}

#[tokio::test]
async fn test_non_image_upload_fails() {
    let response = test_app()
        .oneshot(multipart_upload("file", "notes.txt", b"just some text"))
        .await
        .unwrap();

    assert!(!response.status().is_success());
    let body = read_json(response).await;
    assert!(body.get("embedding").is_none());
    assert_eq!(body["error_type"], "invalid_image");
}

#[tokio::test]
async fn test_empty_upload_fails() {
    let response = test_app()
        .oneshot(multipart_upload("file", "empty.png", &[]))
        .await
        .unwrap();

    assert!(!response.status().is_success());
    assert!(read_json(response).await.get("embedding").is_none());
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let bytes = encode(&solid_image(8, 8, [1, 2, 3]), ImageFormat::Png);
    let response = test_app()
        .oneshot(multipart_upload("image", "x.png", &bytes))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_json(response).await["error_type"], "missing_field");
}

#[tokio::test]
async fn test_upload_over_limit_fails() {
    // Valid PNG header followed by padding past the configured cap
    let mut bytes = encode(&solid_image(8, 8, [9, 9, 9]), ImageFormat::Png);
    bytes.resize(TEST_MAX_UPLOAD + 1, 0);

    let response = test_app()
        .oneshot(multipart_upload("file", "big.png", &bytes))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert!(body.get("embedding").is_none());
    assert_eq!(body["error_type"], "invalid_image");
    assert!(body["message"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_body_far_over_limit_fails() {
    let bytes = vec![0u8; TEST_MAX_UPLOAD * 2];

    let response = test_app()
        .oneshot(multipart_upload("file", "huge.bin", &bytes))
        .await
        .unwrap();

    assert!(!response.status().is_success());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(!String::from_utf8_lossy(&body).contains("embedding"));
}
