// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /image_similarity router tests
//!
//! Images are served from a local axum server. The fake embedder maps each
//! solid colour to a fixed 2-d vector, which puts the red/green pair exactly
//! on the match threshold and the red/blue pair just below it.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lostfound_similarity::{
    api::{image_router, ImageSimilarityState},
    config::FetchConfig,
    embeddings::ImageEmbedder,
    vision::ImageFetcher,
};
use serde_json::{json, Value};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

struct ColourEmbedder;

#[async_trait]
impl ImageEmbedder for ColourEmbedder {
    fn model_name(&self) -> &str {
        "solid-colour"
    }

    fn dimension(&self) -> usize {
        2
    }

    async fn embed_image(&self, image: RgbImage) -> Result<Vec<f32>> {
        match image.get_pixel(0, 0).0 {
            [255, 0, 0] => Ok(vec![1.0, 0.0]),
            [0, 255, 0] => Ok(vec![0.85, 0.526783]),
            [0, 0, 255] => Ok(vec![0.849, 0.528393]),
            [0, 0, 0] => Ok(vec![0.0, 0.0]),
            other => Err(anyhow!("unexpected colour {:?}", other)),
        }
    }
}

fn png(colour: [u8; 3]) -> Response {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb(colour)));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    ([(header::CONTENT_TYPE, "image/png")], buf.into_inner()).into_response()
}

async fn spawn_image_server() -> SocketAddr {
    let app = Router::new()
        .route("/red.png", get(|| async { png([255, 0, 0]) }))
        .route("/green.png", get(|| async { png([0, 255, 0]) }))
        .route("/blue.png", get(|| async { png([0, 0, 255]) }))
        .route("/black.png", get(|| async { png([0, 0, 0]) }))
        .route(
            "/page.html",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html></html>") }),
        )
        .route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                png([255, 0, 0])
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn app_with(config: FetchConfig) -> Router {
    image_router(ImageSimilarityState {
        embedder: Arc::new(ColourEmbedder),
        fetcher: Arc::new(ImageFetcher::new(config).unwrap()),
    })
}

fn app() -> Router {
    app_with(FetchConfig::default())
}

async fn post(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/image_similarity")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

#[cfg(test)]
mod image_similarity_tests {
    use super::*;

    #[tokio::test]
    async fn test_same_image_is_a_match() {
        let addr = spawn_image_server().await;
        let (status, body) = post(
            app(),
            json!({"img1": url(addr, "/red.png"), "img2": url(addr, "/red.png")}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"similarity": 1.0, "match": true}));
    }

    #[tokio::test]
    async fn test_threshold_score_is_a_match() {
        let addr = spawn_image_server().await;
        let (status, body) = post(
            app(),
            json!({"img1": url(addr, "/red.png"), "img2": url(addr, "/green.png")}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["similarity"], json!(0.85));
        assert_eq!(body["match"], json!(true));
    }

    #[tokio::test]
    async fn test_just_below_threshold_is_not_a_match() {
        let addr = spawn_image_server().await;
        let (status, body) = post(
            app(),
            json!({"img1": url(addr, "/red.png"), "img2": url(addr, "/blue.png")}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["similarity"], json!(0.849));
        assert_eq!(body["match"], json!(false));
    }

    #[tokio::test]
    async fn test_symmetric() {
        let addr = spawn_image_server().await;
        let (_, ab) = post(
            app(),
            json!({"img1": url(addr, "/green.png"), "img2": url(addr, "/blue.png")}),
        )
        .await;
        let (_, ba) = post(
            app(),
            json!({"img1": url(addr, "/blue.png"), "img2": url(addr, "/green.png")}),
        )
        .await;

        assert_eq!(ab, ba);
    }

    #[tokio::test]
    async fn test_score_has_at_most_three_decimals() {
        let addr = spawn_image_server().await;
        let (_, body) = post(
            app(),
            json!({"img1": url(addr, "/green.png"), "img2": url(addr, "/blue.png")}),
        )
        .await;

        let similarity = body["similarity"].as_f64().unwrap();
        assert_eq!(similarity, (similarity * 1000.0).round() / 1000.0);
    }

    #[tokio::test]
    async fn test_not_a_url_returns_error_without_similarity() {
        let (status, body) = post(app(), json!({"img1": "not-a-url", "img2": "not-a-url"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").is_some());
        assert!(body.get("similarity").is_none());
    }

    #[tokio::test]
    async fn test_missing_img2() {
        let (status, body) = post(app(), json!({"img1": "https://example.com/a.png"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field 'img2'");
    }

    #[tokio::test]
    async fn test_upstream_404_is_bad_gateway() {
        let addr = spawn_image_server().await;
        let (status, body) = post(
            app(),
            json!({"img1": url(addr, "/red.png"), "img2": url(addr, "/gone.png")}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_html_page_is_unprocessable() {
        let addr = spawn_image_server().await;
        let (status, body) = post(
            app(),
            json!({"img1": url(addr, "/page.html"), "img2": url(addr, "/red.png")}),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Unsupported image format");
    }

    #[tokio::test]
    async fn test_slow_host_times_out() {
        let addr = spawn_image_server().await;
        let app = app_with(FetchConfig {
            timeout: Duration::from_millis(200),
            ..Default::default()
        });
        let (status, body) = post(
            app,
            json!({"img1": url(addr, "/slow.png"), "img2": url(addr, "/red.png")}),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body.get("similarity").is_none());
    }

    #[tokio::test]
    async fn test_zero_embedding_is_an_error() {
        let addr = spawn_image_server().await;
        let (status, body) = post(
            app(),
            json!({"img1": url(addr, "/black.png"), "img2": url(addr, "/red.png")}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("zero-magnitude"));
    }
}
