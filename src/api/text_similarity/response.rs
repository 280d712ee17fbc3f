// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response body for POST /similarity

use serde::{Deserialize, Serialize};

/// Full-precision cosine similarity of the two descriptions
///
/// # Example
/// ```json
/// { "similarity": 0.7364587783813477 }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TextSimilarityResponse {
    pub similarity: f64,
}
