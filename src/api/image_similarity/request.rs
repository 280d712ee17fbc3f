// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request body for POST /image_similarity

use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::SimilarityError;
use crate::vision::ImageFetcher;

/// Request body for POST /image_similarity
///
/// # Example
/// ```json
/// {
///   "img1": "https://storage.example.com/lost/123.jpg",
///   "img2": "https://storage.example.com/found/456.jpg"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSimilarityRequest {
    pub img1: Option<String>,
    pub img2: Option<String>,
}

impl ImageSimilarityRequest {
    /// Checks both image locations are present and are http(s) URLs
    ///
    /// Runs before any network access, so a bad `img2` never costs a
    /// download of `img1`.
    pub fn validate(self) -> Result<(Url, Url), SimilarityError> {
        let img1 = self.img1.ok_or(SimilarityError::MissingField("img1"))?;
        let img2 = self.img2.ok_or(SimilarityError::MissingField("img2"))?;

        Ok((ImageFetcher::parse_url(&img1)?, ImageFetcher::parse_url(&img2)?))
    }
}
