// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use super::support::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_lists_endpoints() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "hashing-test-encoder");
    assert_eq!(body["dimension"], TEST_DIMENSION);

    let endpoints: Vec<&str> = body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e.as_str())
        .collect();
    assert!(endpoints.contains(&"/embed_image/"));
    assert!(endpoints.contains(&"/embed_text/"));
}

#[tokio::test]
async fn test_get_on_embed_route_is_not_allowed() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/embed_text/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
