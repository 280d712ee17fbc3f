// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    FetchConfig, ImageServiceConfig, ModelSource, TextServiceConfig, DEFAULT_IMAGE_ADDR,
    DEFAULT_IMAGE_MODEL_REPO, DEFAULT_TEXT_ADDR, DEFAULT_TEXT_MODEL_REPO,
};

/// Lost & found similarity services
#[derive(Parser, Debug)]
#[command(name = "lostfound-similarity")]
#[command(version)]
#[command(about = "Embedding similarity services for lost and found matching", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve POST /similarity (all-MiniLM-L6-v2)
    Text(TextArgs),

    /// Serve POST /image_similarity (clip-ViT-B-32)
    Image(ImageArgs),
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Address to listen on
    #[arg(long, env = "TEXT_SIMILARITY_ADDR", default_value = DEFAULT_TEXT_ADDR)]
    pub listen: SocketAddr,

    /// Directory holding model.onnx and tokenizer.json (skips the Hub download)
    #[arg(long, env = "TEXT_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Hugging Face repository to download the model from
    #[arg(long, env = "TEXT_MODEL_REPO", default_value = DEFAULT_TEXT_MODEL_REPO)]
    pub model_repo: String,

    /// Longest accepted description, in characters
    #[arg(long, env = "TEXT_MAX_CHARS", default_value_t = crate::config::DEFAULT_MAX_TEXT_CHARS)]
    pub max_chars: usize,
}

impl TextArgs {
    pub fn into_config(self) -> TextServiceConfig {
        TextServiceConfig {
            listen_addr: self.listen,
            model: ModelSource::new(self.model_dir, self.model_repo),
            max_text_chars: self.max_chars,
        }
    }
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Address to listen on
    #[arg(long, env = "IMAGE_SIMILARITY_ADDR", default_value = DEFAULT_IMAGE_ADDR)]
    pub listen: SocketAddr,

    /// Directory holding the CLIP vision model.onnx (skips the Hub download)
    #[arg(long, env = "IMAGE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Hugging Face repository to download the model from
    #[arg(long, env = "IMAGE_MODEL_REPO", default_value = DEFAULT_IMAGE_MODEL_REPO)]
    pub model_repo: String,

    /// Total timeout for one image download, in seconds
    #[arg(long, env = "IMAGE_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    /// Connect timeout for image downloads, in seconds
    #[arg(long, env = "IMAGE_FETCH_CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    pub fetch_connect_timeout_secs: u64,

    /// Largest accepted image body, in bytes
    #[arg(long, env = "IMAGE_FETCH_MAX_BYTES", default_value_t = crate::vision::image_utils::MAX_IMAGE_SIZE)]
    pub fetch_max_bytes: usize,

    /// Redirects followed per download
    #[arg(long, env = "IMAGE_FETCH_MAX_REDIRECTS", default_value_t = 5)]
    pub fetch_max_redirects: usize,
}

impl ImageArgs {
    pub fn into_config(self) -> ImageServiceConfig {
        ImageServiceConfig {
            listen_addr: self.listen,
            model: ModelSource::new(self.model_dir, self.model_repo),
            fetch: FetchConfig {
                timeout: Duration::from_secs(self.fetch_timeout_secs),
                connect_timeout: Duration::from_secs(self.fetch_connect_timeout_secs),
                max_bytes: self.fetch_max_bytes,
                max_redirects: self.fetch_max_redirects,
            },
        }
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Text(args) => crate::api::run_text_service(args.into_config()).await,
        Commands::Image(args) => crate::api::run_image_service(args.into_config()).await,
    }
}
