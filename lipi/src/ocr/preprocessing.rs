use image::{imageops::FilterType, DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::config::ImageConfig;
use crate::error::{LipiError, Result};
use crate::models::{ExtractOptions, ImageInfo};

/// Decode image bytes and record their metadata as received.
pub fn inspect(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LipiError::InvalidImage(format!("Invalid image data: {e}")))?;
    let format = reader.format();

    let img = reader.decode().map_err(|e| {
        tracing::debug!(error = %e, "Image decode failed");
        LipiError::InvalidImage("Invalid image data".to_string())
    })?;

    let info = ImageInfo::from_image(&img, format);
    Ok((img, info))
}

/// Bring a decoded image into the shape the OCR backends expect.
///
/// 1. Rejects images smaller than the minimum dimension
/// 2. Drops the alpha channel (everything becomes RGB8)
/// 3. Downscales oversized images, keeping the aspect ratio (Lanczos3)
/// 4. With `preprocess`: grayscale, 3x3 median denoise, contrast stretch
pub fn normalize(
    img: DynamicImage,
    options: &ExtractOptions,
    config: &ImageConfig,
) -> Result<DynamicImage> {
    let (width, height) = img.dimensions();
    if width < config.min_image_dimension || height < config.min_image_dimension {
        return Err(LipiError::InvalidImage(format!(
            "Image too small: {}x{}, minimum {}x{}",
            width, height, config.min_image_dimension, config.min_image_dimension
        )));
    }

    let img = to_rgb(img);
    let img = resize_if_needed(img, config.max_image_dimension);

    if !options.preprocess {
        return Ok(img);
    }

    let gray = img.to_luma8();
    let denoised = imageproc::filter::median_filter(&gray, 1, 1);
    Ok(DynamicImage::ImageLuma8(stretch_contrast(denoised)))
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| LipiError::Processing(format!("Failed to encode image: {e}")))?;
    Ok(output)
}

/// Decode, normalize and re-encode as PNG. CPU-bound; call it from a
/// blocking thread.
pub fn prepare(
    bytes: &[u8],
    options: &ExtractOptions,
    config: &ImageConfig,
) -> Result<(Vec<u8>, ImageInfo)> {
    let (img, info) = inspect(bytes)?;
    let img = normalize(img, options, config)?;
    let png = encode_png(&img)?;

    tracing::debug!(
        original_width = info.width,
        original_height = info.height,
        encoded_bytes = png.len(),
        "Image prepared for OCR"
    );

    Ok((png, info))
}

fn to_rgb(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Longer side becomes `max_dim`, shorter side is scaled down and floored.
fn target_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width <= max_dim && height <= max_dim {
        return (width, height);
    }

    let scale = |short: u32, long: u32| ((short as u64 * max_dim as u64) / long as u64).max(1) as u32;
    if width >= height {
        (max_dim, scale(height, width))
    } else {
        (scale(width, height), max_dim)
    }
}

fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let (new_width, new_height) = target_dimensions(width, height, max_dim);
    if (new_width, new_height) == (width, height) {
        return img;
    }

    tracing::debug!(width, height, new_width, new_height, "Resizing image");
    img.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Maps the darkest pixel to 0 and the lightest to 255. Flat images are
/// returned untouched.
fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (min_val, max_val) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max_val <= min_val {
        return gray;
    }

    let range = (max_val - min_val) as f32;
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0];
        image::Luma([(((value - min_val) as f32 / range) * 255.0).round() as u8])
    })
}
