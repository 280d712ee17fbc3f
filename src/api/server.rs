// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP servers for the text and image similarity services
//!
//! Each service is its own process with its own router, listener and
//! preloaded model.

use anyhow::{anyhow, Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::health::{image_health_handler, text_health_handler};
use super::image_similarity::{image_similarity_handler, ImageSimilarityState};
use super::text_similarity::{text_similarity_handler, TextSimilarityState};
use crate::config::{ImageServiceConfig, TextServiceConfig};
use crate::embeddings::{load_image_model, load_text_model};
use crate::vision::ImageFetcher;

pub fn text_router(state: TextSimilarityState) -> Router {
    Router::new()
        .route("/similarity", post(text_similarity_handler))
        .route("/health", get(text_health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn image_router(state: ImageSimilarityState) -> Router {
    Router::new()
        .route("/image_similarity", post(image_similarity_handler))
        .route("/health", get(image_health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `router` on `listener` until Ctrl+C
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Loads all-MiniLM-L6-v2 and serves POST /similarity
pub async fn run_text_service(config: TextServiceConfig) -> Result<()> {
    config.validate().map_err(|e| anyhow!(e))?;

    let model = load_text_model(config.model.clone()).await?;
    let state = TextSimilarityState {
        embedder: Arc::new(model),
        max_text_chars: config.max_text_chars,
    };

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Text similarity service listening on {}", config.listen_addr);

    serve(listener, text_router(state)).await
}

/// Loads clip-ViT-B-32 and serves POST /image_similarity
pub async fn run_image_service(config: ImageServiceConfig) -> Result<()> {
    config.validate().map_err(|e| anyhow!(e))?;

    let fetcher = ImageFetcher::new(config.fetch.clone())?;
    let model = load_image_model(config.model.clone()).await?;
    let state = ImageSimilarityState {
        embedder: Arc::new(model),
        fetcher: Arc::new(fetcher),
    };

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Image similarity service listening on {}", config.listen_addr);

    serve(listener, image_router(state)).await
}
