// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! GET /health for both services

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::image_similarity::ImageSimilarityState;
use super::text_similarity::TextSimilarityState;
use crate::version::VERSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub model: String,
    pub version: String,
}

impl HealthResponse {
    fn ok(service: &str, model: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            model: model.to_string(),
            version: VERSION.to_string(),
        }
    }
}

pub async fn text_health_handler(State(state): State<TextSimilarityState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok("text-similarity", state.embedder.model_name()))
}

pub async fn image_health_handler(
    State(state): State<ImageSimilarityState>,
) -> Json<HealthResponse> {
    Json(HealthResponse::ok("image-similarity", state.embedder.model_name()))
}
