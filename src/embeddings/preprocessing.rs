// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the CLIP ViT-B/32 vision encoder

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

/// Input resolution of the ViT-B/32 vision tower
pub const CLIP_INPUT_SIZE: u32 = 224;

/// CLIP normalization mean values
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std values
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess an RGB image for the CLIP encoder
///
/// Steps:
/// 1. Center crop to a square on the shortest side
/// 2. Resize to `CLIP_INPUT_SIZE` x `CLIP_INPUT_SIZE` (bicubic)
/// 3. Normalize: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_clip(image: &RgbImage) -> Array4<f32> {
    let cropped = resize_and_center_crop(image, CLIP_INPUT_SIZE);

    let size = CLIP_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in cropped.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - CLIP_MEAN[c]) / CLIP_STD[c];
        }
    }

    tensor
}

/// Crop the center square, then resize it to `target` x `target`
///
/// Equivalent to resizing the shortest side to `target` and center cropping,
/// but the intermediate buffer never exceeds the source's short side squared.
pub fn resize_and_center_crop(image: &RgbImage, target: u32) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return RgbImage::new(target, target);
    }

    let side = orig_w.min(orig_h);
    let crop_x = (orig_w - side) / 2;
    let crop_y = (orig_h - side) / 2;
    let square = imageops::crop_imm(image, crop_x, crop_y, side, side).to_image();

    if side == target {
        return square;
    }
    imageops::resize(&square, target, target, FilterType::CatmullRom)
}
