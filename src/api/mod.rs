// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod health;
pub mod image_similarity;
pub mod server;
pub mod text_similarity;

pub use errors::{ErrorResponse, SimilarityError};
pub use health::HealthResponse;
pub use image_similarity::{
    image_similarity_handler, ImageSimilarityRequest, ImageSimilarityResponse,
    ImageSimilarityState,
};
pub use server::{image_router, run_image_service, run_text_service, serve, text_router};
pub use text_similarity::{
    text_similarity_handler, TextSimilarityRequest, TextSimilarityResponse, TextSimilarityState,
};
