use std::path::Path;

use image::{imageops, DynamicImage, GrayImage, Luma};
use log::debug;

use super::IntensityField;
use crate::error::{ConfigError, Result};

/// Decodes the picture at `path` and runs it through [`preprocess`].
pub fn load(path: impl AsRef<Path>, size: u32) -> Result<IntensityField> {
    let image = image::open(path)?;
    preprocess(&image, size)
}

/// Turns an arbitrary picture into a `size`x`size` intensity field.
///
/// The picture is converted to gray, scaled to fit while keeping its aspect
/// ratio and centered on a canvas filled with its most common gray level, so
/// the letterbox blends with the background. A zero `size` is rejected.
pub fn preprocess(image: &DynamicImage, size: u32) -> Result<IntensityField> {
    if size == 0 {
        return Err(ConfigError::ImageSize.into());
    }
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let background = dominant_level(&gray);
    debug!("preprocessing {width}x{height} image onto {size}x{size} canvas, background {background}");

    let mut canvas = GrayImage::from_pixel(size, size, Luma([background]));
    if width == 0 || height == 0 {
        return Ok(canvas.into());
    }

    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
    let new_width = ((width as f32 * scale) as u32).clamp(1, size);
    let new_height = ((height as f32 * scale) as u32).clamp(1, size);
    let resized = imageops::resize(
        &gray,
        new_width,
        new_height,
        imageops::FilterType::Lanczos3,
    );
    imageops::replace(
        &mut canvas,
        &resized,
        ((size - new_width) / 2) as i64,
        ((size - new_height) / 2) as i64,
    );
    Ok(canvas.into())
}

/// Most frequent gray level; ties go to the darker level.
fn dominant_level(image: &GrayImage) -> u8 {
    let mut histogram = [0usize; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    let mut best = 0;
    for level in 1..histogram.len() {
        if histogram[level] > histogram[best] {
            best = level;
        }
    }
    best as u8
}
