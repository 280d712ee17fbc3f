// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text similarity API
//!
//! POST /similarity compares two descriptions with all-MiniLM-L6-v2 and
//! returns the unrounded cosine similarity.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{text_similarity_handler, TextSimilarityState};
pub use request::TextSimilarityRequest;
pub use response::TextSimilarityResponse;
