// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding for fetched image bodies

use image::{ImageFormat, ImageReader, Limits, RgbImage};
use std::io::Cursor;
use thiserror::Error;

/// Maximum decoded body size accepted by default (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Largest width or height accepted when decoding
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;

/// Largest allocation the decoder may make (256MB)
pub const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

/// Custom error types for image decoding
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Image dimensions exceed decoder limits: {0}")]
    DimensionsTooLarge(String),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Image information extracted during decoding
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Decode raw image bytes into an 8-bit RGB buffer
///
/// Any alpha channel is dropped and embedded colour profiles are ignored, so
/// every image reaches the encoder in the same 3-channel model.
///
/// # Errors
/// Returns `ImageError` if the data is empty, larger than `max_size`, not a
/// recognised image format, wider or taller than `MAX_IMAGE_DIMENSION`, or
/// fails to decode.
pub fn decode_rgb(bytes: &[u8], max_size: usize) -> Result<(RgbImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    if bytes.len() > max_size {
        return Err(ImageError::TooLarge(bytes.len(), max_size));
    }

    let format = detect_format(bytes)?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);

    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.limits(limits);

    let img = reader.decode().map_err(|e| match e {
        image::ImageError::Limits(limit) => ImageError::DimensionsTooLarge(limit.to_string()),
        other => ImageError::DecodeFailed(other.to_string()),
    })?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img.to_rgb8(), info))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)
}
