// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /similarity handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use std::sync::Arc;
use tracing::debug;

use super::{TextSimilarityRequest, TextSimilarityResponse};
use crate::api::SimilarityError;
use crate::embeddings::TextEmbedder;
use crate::similarity::cosine_similarity;

/// Shared state for the text service
#[derive(Clone)]
pub struct TextSimilarityState {
    /// Loaded once at startup, shared by every request
    pub embedder: Arc<dyn TextEmbedder>,
    pub max_text_chars: usize,
}

/// POST /similarity handler
///
/// # Request Body
/// ```json
/// { "desc1": "<string>", "desc2": "<string>" }
/// ```
///
/// # Response Body
/// ```json
/// { "similarity": 0.73645877 }
/// ```
///
/// Failures render as `{"error": "<message>"}` (see `SimilarityError`).
pub async fn text_similarity_handler(
    State(state): State<TextSimilarityState>,
    body: Result<Json<TextSimilarityRequest>, JsonRejection>,
) -> Result<Json<TextSimilarityResponse>, SimilarityError> {
    let Json(request) = body.map_err(|e| SimilarityError::MalformedBody(e.body_text()))?;
    let (desc1, desc2) = request.validate(state.max_text_chars)?;

    let emb1 = state
        .embedder
        .embed_text(&desc1)
        .await
        .map_err(SimilarityError::embedding)?;
    let emb2 = state
        .embedder
        .embed_text(&desc2)
        .await
        .map_err(SimilarityError::embedding)?;

    let similarity = cosine_similarity(&emb1, &emb2)?;

    debug!(
        model = state.embedder.model_name(),
        similarity, "Computed text similarity"
    );

    Ok(Json(TextSimilarityResponse { similarity }))
}
