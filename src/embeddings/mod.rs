// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding models
//!
//! Each service loads exactly one model at startup and shares it across all
//! requests through `Arc<dyn TextEmbedder>` / `Arc<dyn ImageEmbedder>`.
//! ONNX inference is CPU-bound, so the implementations run it on the
//! blocking thread pool.

pub mod clip_model;
pub mod model_files;
pub mod onnx_model;
pub mod preprocessing;

pub use clip_model::OnnxClipModel;
pub use model_files::{resolve_image_files, resolve_text_files, ImageModelFiles, TextModelFiles};
pub use onnx_model::OnnxTextModel;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::RgbImage;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{ModelSource, IMAGE_MODEL_NAME, TEXT_MODEL_NAME};

/// Produces a fixed-dimension embedding for a text string
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;
}

/// Produces a fixed-dimension embedding for a decoded RGB image
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;

    async fn embed_image(&self, image: RgbImage) -> Result<Vec<f32>>;
}

/// Loads the text model, downloading its files first if needed
pub async fn load_text_model(source: ModelSource) -> Result<OnnxTextModel> {
    tokio::task::spawn_blocking(move || {
        let files = resolve_text_files(&source)?;
        OnnxTextModel::load(TEXT_MODEL_NAME, &files.model, &files.tokenizer)
    })
    .await
    .context("Text model loading task panicked")?
}

/// Loads the CLIP vision model, downloading its files first if needed
pub async fn load_image_model(source: ModelSource) -> Result<OnnxClipModel> {
    tokio::task::spawn_blocking(move || {
        let files = resolve_image_files(&source)?;
        OnnxClipModel::load(IMAGE_MODEL_NAME, &files.model)
    })
    .await
    .context("Image model loading task panicked")?
}

/// Builds an ONNX Runtime session, trying CUDA before falling back to CPU
pub(crate) fn build_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("ONNX model file not found: {}", model_path.display());
    }

    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!("CUDA execution provider initialized for {}", model_path.display());
            Ok(session)
        }
        Err(e) => {
            warn!("CUDA execution provider failed: {}", e);
            warn!("Falling back to CPU execution provider");
            Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(4)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .with_context(|| {
                    format!("Failed to load ONNX model from {}", model_path.display())
                })
        }
    }
}
