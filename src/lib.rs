// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod similarity;
pub mod version;
pub mod vision;

pub use api::{ImageSimilarityState, SimilarityError, TextSimilarityState};
pub use config::{FetchConfig, ImageServiceConfig, ModelSource, TextServiceConfig};
pub use embeddings::{ImageEmbedder, OnnxClipModel, OnnxTextModel, TextEmbedder};
pub use similarity::{cosine_similarity, is_match, round_score, ImageScore, MATCH_THRESHOLD};
pub use vision::{FetchError, ImageFetcher};
