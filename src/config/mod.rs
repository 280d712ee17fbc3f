// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Each service process is configured independently. Values come from CLI
//! flags or their environment variable fallbacks (see `crate::cli`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Text model identity
pub const TEXT_MODEL_NAME: &str = "all-MiniLM-L6-v2";
/// Hugging Face repository holding the text model's ONNX export
pub const DEFAULT_TEXT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Image model identity
pub const IMAGE_MODEL_NAME: &str = "clip-ViT-B-32";
/// Hugging Face repository holding the CLIP vision tower ONNX export
pub const DEFAULT_IMAGE_MODEL_REPO: &str = "Qdrant/clip-ViT-B-32-vision";

pub const DEFAULT_TEXT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_IMAGE_ADDR: &str = "127.0.0.1:5001";

/// Longest description accepted by the text service, in characters
pub const DEFAULT_MAX_TEXT_CHARS: usize = 8192;

/// Where a service loads its model files from
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Directory already containing the model files
    LocalDir(PathBuf),
    /// Hugging Face Hub repository, downloaded into the local HF cache
    Hub { repo: String },
}

impl ModelSource {
    pub fn new(dir: Option<PathBuf>, repo: String) -> Self {
        match dir {
            Some(dir) => Self::LocalDir(dir),
            None => Self::Hub { repo },
        }
    }
}

/// Outbound image fetch limits
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Total time allowed for one fetch, body included (default: 10s)
    pub timeout: Duration,
    /// Time allowed to establish the connection (default: 5s)
    pub connect_timeout: Duration,
    /// Largest accepted response body in bytes (default: 10MB)
    pub max_bytes: usize,
    /// Redirects followed before giving up (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_bytes: crate::vision::image_utils::MAX_IMAGE_SIZE,
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout.is_zero() {
            return Err("fetch timeout must be greater than 0".to_string());
        }
        if self.connect_timeout.is_zero() {
            return Err("fetch connect timeout must be greater than 0".to_string());
        }
        if self.max_bytes == 0 {
            return Err("fetch max_bytes must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Configuration for the text similarity service
#[derive(Debug, Clone)]
pub struct TextServiceConfig {
    pub listen_addr: SocketAddr,
    pub model: ModelSource,
    pub max_text_chars: usize,
}

impl TextServiceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_chars == 0 {
            return Err("max_text_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Configuration for the image similarity service
#[derive(Debug, Clone)]
pub struct ImageServiceConfig {
    pub listen_addr: SocketAddr,
    pub model: ModelSource,
    pub fetch: FetchConfig,
}

impl ImageServiceConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.fetch.validate()
    }
}
