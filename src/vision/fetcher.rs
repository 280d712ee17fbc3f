// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote image fetching with timeouts and a body size cap

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::FetchConfig;

/// Image fetch error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// Value could not be parsed as an absolute URL
    #[error("Invalid image URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Only http and https are fetched
    #[error("Unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    /// Request exceeded the configured timeout
    #[error("Timed out fetching image: {0}")]
    Timeout(String),

    /// Connection or protocol failure
    #[error("Failed to fetch image: {0}")]
    Transport(String),

    /// Remote host answered with a non-success status
    #[error("HTTP {0} fetching image: {1}")]
    HttpStatus(u16, String),

    /// Body exceeded the configured size cap
    #[error("Image body exceeds {limit} bytes: {url}")]
    TooLarge { url: String, limit: usize },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Downloads image bodies for the image similarity service
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    config: FetchConfig,
}

impl ImageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("lostfound-similarity/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Parse and validate an image location before any network access
    pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
        let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        Ok(url)
    }

    /// Fetch the full body of an image URL
    ///
    /// The body is streamed and abandoned as soon as it passes
    /// `config.max_bytes`, whether or not the server sent a Content-Length.
    pub async fn fetch(&self, raw_url: &str) -> Result<Bytes, FetchError> {
        let url = Self::parse_url(raw_url)?;
        let limit = self.config.max_bytes;

        debug!("Fetching image from: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16(), url.to_string()));
        }

        if let Some(length) = response.content_length() {
            if length > limit as u64 {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit,
                });
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify(&url, e))?;
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from: {}", body.len(), url);

        Ok(body.freeze())
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn classify(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
