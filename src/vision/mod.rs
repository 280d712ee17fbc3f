// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image acquisition: remote fetching and RGB decoding

pub mod fetcher;
pub mod image_utils;

pub use fetcher::{FetchError, ImageFetcher};
pub use image_utils::{decode_rgb, ImageError, ImageInfo};
