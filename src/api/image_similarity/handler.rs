// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /image_similarity handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use image::RgbImage;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::{ImageSimilarityRequest, ImageSimilarityResponse};
use crate::api::SimilarityError;
use crate::embeddings::ImageEmbedder;
use crate::similarity::{cosine_similarity, ImageScore};
use crate::vision::{decode_rgb, ImageFetcher};

/// Shared state for the image service
#[derive(Clone)]
pub struct ImageSimilarityState {
    /// Loaded once at startup, shared by every request
    pub embedder: Arc<dyn ImageEmbedder>,
    pub fetcher: Arc<ImageFetcher>,
}

/// POST /image_similarity handler
///
/// Pipeline: validate → fetch both images concurrently → decode to RGB →
/// embed → cosine similarity → round → threshold.
///
/// # Request Body
/// ```json
/// { "img1": "<url>", "img2": "<url>" }
/// ```
///
/// # Response Body
/// ```json
/// { "similarity": 0.912, "match": true }
/// ```
///
/// Failures render as `{"error": "<message>"}` (see `SimilarityError`).
pub async fn image_similarity_handler(
    State(state): State<ImageSimilarityState>,
    body: Result<Json<ImageSimilarityRequest>, JsonRejection>,
) -> Result<Json<ImageSimilarityResponse>, SimilarityError> {
    let Json(request) = body.map_err(|e| SimilarityError::MalformedBody(e.body_text()))?;
    let (url1, url2) = request.validate()?;

    let (img1, img2) = tokio::try_join!(
        load_image(&state.fetcher, &url1),
        load_image(&state.fetcher, &url2)
    )?;

    let emb1 = state
        .embedder
        .embed_image(img1)
        .await
        .map_err(SimilarityError::embedding)?;
    let emb2 = state
        .embedder
        .embed_image(img2)
        .await
        .map_err(SimilarityError::embedding)?;

    let raw = cosine_similarity(&emb1, &emb2)?;
    let score = ImageScore::from_raw(raw);

    debug!(
        model = state.embedder.model_name(),
        raw,
        similarity = score.similarity,
        is_match = score.is_match,
        "Computed image similarity"
    );

    Ok(Json(score.into()))
}

/// Fetch one image and decode it to RGB off the async runtime
async fn load_image(fetcher: &ImageFetcher, url: &Url) -> Result<RgbImage, SimilarityError> {
    let bytes = fetcher.fetch(url.as_str()).await?;
    let max_bytes = fetcher.config().max_bytes;

    let (image, info) = tokio::task::spawn_blocking(move || decode_rgb(&bytes, max_bytes))
        .await
        .map_err(|e| SimilarityError::Internal(format!("Image decoding task failed: {}", e)))??;

    debug!(
        "Decoded {:?} image {}x{} ({} bytes) from {}",
        info.format, info.width, info.height, info.size_bytes, url
    );

    Ok(image)
}
