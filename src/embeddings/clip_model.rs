// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CLIP ViT-B/32 vision encoder (clip-ViT-B-32)
//!
//! Runs the vision tower plus projection exported to ONNX and returns the
//! 512-dimensional image embedding.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use image::RgbImage;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{preprocess_for_clip, CLIP_INPUT_SIZE};
use super::{build_session, ImageEmbedder};

/// Output dimension of the ViT-B/32 image projection
pub const IMAGE_EMBEDDING_DIM: usize = 512;

/// Preferred output when an export carries both embeddings and hidden states
const IMAGE_EMBEDS_OUTPUT: &str = "image_embeds";

/// ONNX-based CLIP image encoder
#[derive(Clone)]
pub struct OnnxClipModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    output_index: usize,
    model_name: String,
    dimension: usize,
}

impl std::fmt::Debug for OnnxClipModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClipModel")
            .field("model_name", &self.model_name)
            .field("input_name", &self.input_name)
            .field("output_index", &self.output_index)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxClipModel {
    /// Loads the vision encoder and validates it produces 512-dim embeddings
    ///
    /// Blocking: call from `spawn_blocking` or before the runtime starts.
    pub fn load(model_name: impl Into<String>, model_path: &Path) -> Result<Self> {
        let model_name = model_name.into();

        info!("Loading image embedding model {} from {}", model_name, model_path.display());
        let session = build_session(model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "pixel_values".to_string());

        let output_index = session
            .outputs
            .iter()
            .position(|output| output.name == IMAGE_EMBEDS_OUTPUT)
            .unwrap_or(0);

        debug!(
            "CLIP encoder loaded - input: {}, output index: {}",
            input_name, output_index
        );

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_index,
            model_name,
            dimension: IMAGE_EMBEDDING_DIM,
        };

        let probe = RgbImage::from_pixel(CLIP_INPUT_SIZE, CLIP_INPUT_SIZE, image::Rgb([128, 128, 128]));
        model
            .embed_blocking(&probe)
            .context("Image model validation inference failed")?;

        info!(
            "Image embedding model {} loaded ({} dimensions)",
            model.model_name, model.dimension
        );

        Ok(model)
    }

    /// Embeds one image on the calling thread
    pub fn embed_blocking(&self, image: &RgbImage) -> Result<Vec<f32>> {
        let pixel_values = preprocess_for_clip(image);
        let input_value =
            Value::from_array(pixel_values).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Image encoder inference failed")?;

        let output = outputs[self.output_index]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let embedding: Vec<f32> = output.iter().copied().collect();

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected image embedding shape {:?} (expected [1, {}])",
                output.shape(),
                self.dimension
            );
        }

        Ok(embedding)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl ImageEmbedder for OnnxClipModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_image(&self, image: RgbImage) -> Result<Vec<f32>> {
        let model = self.clone();
        tokio::task::spawn_blocking(move || model.embed_blocking(&image))
            .await
            .context("Image embedding task panicked")?
    }
}
