// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image similarity API
//!
//! POST /image_similarity fetches two images, embeds them with
//! clip-ViT-B-32 and returns the similarity rounded to three decimals along
//! with a match flag at the 0.85 threshold.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{image_similarity_handler, ImageSimilarityState};
pub use request::ImageSimilarityRequest;
pub use response::ImageSimilarityResponse;
