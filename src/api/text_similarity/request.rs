// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request body for POST /similarity

use serde::{Deserialize, Serialize};

use crate::api::SimilarityError;

/// Request body for POST /similarity
///
/// Fields are optional at the serde level so a missing description is
/// reported by `validate` as a named field rather than a generic parse error.
///
/// # Example
/// ```json
/// { "desc1": "a lost black wallet", "desc2": "found a black leather wallet" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextSimilarityRequest {
    pub desc1: Option<String>,
    pub desc2: Option<String>,
}

impl TextSimilarityRequest {
    /// Checks both descriptions are present and within `max_chars`
    ///
    /// Empty descriptions are accepted; the model embeds them like any other
    /// input.
    pub fn validate(self, max_chars: usize) -> Result<(String, String), SimilarityError> {
        let desc1 = self.desc1.ok_or(SimilarityError::MissingField("desc1"))?;
        let desc2 = self.desc2.ok_or(SimilarityError::MissingField("desc2"))?;

        for (field, text) in [("desc1", &desc1), ("desc2", &desc2)] {
            let chars = text.chars().count();
            if chars > max_chars {
                return Err(SimilarityError::InvalidField {
                    field,
                    message: format!(
                        "text cannot exceed {} characters (got {})",
                        max_chars, chars
                    ),
                });
            }
        }

        Ok((desc1, desc2))
    }
}
