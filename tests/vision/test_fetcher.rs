// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ImageFetcher tests against a local HTTP server

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use lostfound_similarity::{
    config::FetchConfig,
    vision::{decode_rgb, FetchError, ImageError, ImageFetcher},
};
use std::io::Cursor;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(4, 4)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route(
            "/ok.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_bytes()) }),
        )
        .route("/big.bin", get(|| async { vec![0u8; 4096] }))
        .route(
            "/chunked.bin",
            get(|| async {
                let chunks = vec![
                    Ok::<_, std::io::Error>(Bytes::from(vec![0u8; 800])),
                    Ok(Bytes::from(vec![0u8; 800])),
                ];
                Body::from_stream(futures::stream::iter(chunks))
            }),
        )
        .route(
            "/error",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        )
        .route("/moved", get(|| async { Redirect::temporary("/ok.png") }))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route("/text.txt", get(|| async { "just some text" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn fetcher(config: FetchConfig) -> ImageFetcher {
    ImageFetcher::new(config).unwrap()
}

#[cfg(test)]
mod fetcher_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_success() {
        let addr = spawn_server().await;
        let body = fetcher(FetchConfig::default())
            .fetch(&format!("http://{}/ok.png", addr))
            .await
            .unwrap();

        assert_eq!(body.as_ref(), png_bytes().as_slice());
        let (img, _) = decode_rgb(&body, FetchConfig::default().max_bytes).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let addr = spawn_server().await;
        let result = fetcher(FetchConfig::default())
            .fetch(&format!("http://{}/nothing-here", addr))
            .await;

        assert!(matches!(result, Err(FetchError::HttpStatus(404, _))));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let addr = spawn_server().await;
        let result = fetcher(FetchConfig::default())
            .fetch(&format!("http://{}/error", addr))
            .await;

        assert!(matches!(result, Err(FetchError::HttpStatus(500, _))));
    }

    #[tokio::test]
    async fn test_content_length_over_limit() {
        let addr = spawn_server().await;
        let config = FetchConfig {
            max_bytes: 1024,
            ..Default::default()
        };
        let result = fetcher(config)
            .fetch(&format!("http://{}/big.bin", addr))
            .await;

        assert!(matches!(result, Err(FetchError::TooLarge { limit: 1024, .. })));
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit() {
        let addr = spawn_server().await;
        let config = FetchConfig {
            max_bytes: 1024,
            ..Default::default()
        };
        let result = fetcher(config)
            .fetch(&format!("http://{}/chunked.bin", addr))
            .await;

        assert!(matches!(result, Err(FetchError::TooLarge { limit: 1024, .. })));
    }

    #[tokio::test]
    async fn test_follows_redirect() {
        let addr = spawn_server().await;
        let body = fetcher(FetchConfig::default())
            .fetch(&format!("http://{}/moved", addr))
            .await
            .unwrap();

        assert_eq!(body.as_ref(), png_bytes().as_slice());
    }

    #[tokio::test]
    async fn test_redirect_loop_is_transport_error() {
        let addr = spawn_server().await;
        let result = fetcher(FetchConfig::default())
            .fetch(&format!("http://{}/loop", addr))
            .await;

        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        let addr = spawn_server().await;
        let config = FetchConfig {
            timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let result = fetcher(config)
            .fetch(&format!("http://{}/slow", addr))
            .await;

        assert!(matches!(result, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = fetcher(FetchConfig::default())
            .fetch(&format!("http://{}/ok.png", addr))
            .await;

        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_text_body_does_not_decode() {
        let addr = spawn_server().await;
        let body = fetcher(FetchConfig::default())
            .fetch(&format!("http://{}/text.txt", addr))
            .await
            .unwrap();

        assert!(matches!(
            decode_rgb(&body, FetchConfig::default().max_bytes),
            Err(ImageError::UnsupportedFormat)
        ));
    }
}
