// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Similarity scoring and match decisions
//!
//! Both services reduce two embeddings to a single cosine similarity. The
//! text service reports that value as-is; the image service rounds it to
//! three decimals and classifies the rounded value against a fixed
//! threshold.

use thiserror::Error;

/// Inclusive cutoff at which two images are declared a match
pub const MATCH_THRESHOLD: f64 = 0.85;

/// Decimal places kept in image similarity responses
pub const SCORE_DECIMALS: i32 = 3;

/// Errors produced while scoring two embedding vectors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("Embedding vectors are empty")]
    Empty,

    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Cosine similarity is undefined for a zero-magnitude embedding")]
    ZeroMagnitude,

    #[error("Embedding contains NaN or infinite components")]
    NonFinite,
}

/// Cosine similarity of two equal-length vectors: dot(a, b) / (|a| * |b|)
///
/// Accumulates in f64. The result is not clamped, so floating-point error may
/// land marginally outside [-1, 1].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, ScoreError> {
    if a.len() != b.len() {
        return Err(ScoreError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(ScoreError::Empty);
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !(dot.is_finite() && norm_a.is_finite() && norm_b.is_finite()) {
        return Err(ScoreError::NonFinite);
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return Err(ScoreError::ZeroMagnitude);
    }

    Ok(dot / denominator)
}

/// Rounds a score to [`SCORE_DECIMALS`] places (half away from zero)
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}

/// True iff `score >= MATCH_THRESHOLD`
pub fn is_match(score: f64) -> bool {
    score >= MATCH_THRESHOLD
}

/// Rounded score and match flag for an image comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageScore {
    pub similarity: f64,
    pub is_match: bool,
}

impl ImageScore {
    /// Rounds the raw score first, then applies the threshold to the rounded value
    pub fn from_raw(raw: f64) -> Self {
        let similarity = round_score(raw);
        Self {
            similarity,
            is_match: is_match(similarity),
        }
    }
}
