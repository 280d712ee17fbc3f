// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file resolution
//!
//! A service either points at a local directory that already holds the ONNX
//! export, or names a Hugging Face repository whose files are downloaded once
//! into the standard HF cache and reused on later starts.

use anyhow::{Context, Result};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::ModelSource;

/// ONNX locations tried in order, covering both flat and `onnx/` layouts
pub const ONNX_MODEL_CANDIDATES: &[&str] = &["model.onnx", "onnx/model.onnx"];

pub const TOKENIZER_CANDIDATES: &[&str] = &["tokenizer.json", "onnx/tokenizer.json"];

#[derive(Debug, Clone, PartialEq)]
pub struct TextModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageModelFiles {
    pub model: PathBuf,
}

/// Locates (or downloads) the text model's ONNX file and tokenizer
pub fn resolve_text_files(source: &ModelSource) -> Result<TextModelFiles> {
    Ok(TextModelFiles {
        model: resolve_file(source, ONNX_MODEL_CANDIDATES)?,
        tokenizer: resolve_file(source, TOKENIZER_CANDIDATES)?,
    })
}

/// Locates (or downloads) the image model's ONNX file
pub fn resolve_image_files(source: &ModelSource) -> Result<ImageModelFiles> {
    Ok(ImageModelFiles {
        model: resolve_file(source, ONNX_MODEL_CANDIDATES)?,
    })
}

/// Returns the first candidate present in the source
fn resolve_file(source: &ModelSource, candidates: &[&str]) -> Result<PathBuf> {
    match source {
        ModelSource::LocalDir(dir) => candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .with_context(|| {
                format!(
                    "None of {:?} found in model directory {}",
                    candidates,
                    dir.display()
                )
            }),
        ModelSource::Hub { repo } => {
            let api = Api::new().context("Failed to initialize Hugging Face Hub client")?;
            let repo_api = api.repo(Repo::new(repo.clone(), RepoType::Model));

            let mut last_error = None;
            for name in candidates {
                debug!("Resolving {} from {}", name, repo);
                match repo_api.get(name) {
                    Ok(path) => {
                        info!("Resolved {}/{} -> {}", repo, name, path.display());
                        return Ok(path);
                    }
                    Err(e) => last_error = Some(e),
                }
            }

            match last_error {
                Some(e) => Err(e)
                    .with_context(|| format!("None of {:?} available in {}", candidates, repo)),
                None => anyhow::bail!("No candidate files given for {}", repo),
            }
        }
    }
}
