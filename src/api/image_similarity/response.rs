// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response body for POST /image_similarity

use serde::{Deserialize, Serialize};

use crate::similarity::ImageScore;

/// Rounded similarity and match decision
///
/// # Example
/// ```json
/// { "similarity": 0.912, "match": true }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ImageSimilarityResponse {
    /// Cosine similarity rounded to 3 decimals
    pub similarity: f64,

    /// `similarity >= 0.85`
    #[serde(rename = "match")]
    pub is_match: bool,
}

impl From<ImageScore> for ImageSimilarityResponse {
    fn from(score: ImageScore) -> Self {
        Self {
            similarity: score.similarity,
            is_match: score.is_match,
        }
    }
}
