// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error contract shared by both similarity endpoints
//!
//! Every failure in a handler pipeline (validate, fetch, decode, embed,
//! score) is a `SimilarityError` variant. At the boundary each one renders
//! as `{"error": "<message>"}` with a status that reflects its cause.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::similarity::ScoreError;
use crate::vision::{FetchError, ImageError};

/// Body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum SimilarityError {
    /// Body is not valid JSON, has the wrong content type, or mistyped fields
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid field '{field}': {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimilarityError {
    /// Wraps a model failure, keeping its whole context chain in the message
    pub fn embedding(e: anyhow::Error) -> Self {
        Self::Embedding(format!("{:#}", e))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::MissingField(_) | Self::InvalidField { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Fetch(e) => match e {
                FetchError::InvalidUrl { .. } | FetchError::UnsupportedScheme(_) => {
                    StatusCode::BAD_REQUEST
                }
                FetchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                FetchError::Transport(_) | FetchError::HttpStatus(..) => StatusCode::BAD_GATEWAY,
                FetchError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                FetchError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Image(ImageError::TooLarge(..) | ImageError::DimensionsTooLarge(_)) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Embedding(_) | Self::Score(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for SimilarityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Similarity request failed ({}): {}", status.as_u16(), self);
        } else {
            warn!("Similarity request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Json(self.to_response())).into_response()
    }
}
