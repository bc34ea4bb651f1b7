use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use tracing::debug;

use wardrobe_core::ports::{
    CompressedImage, CompressionError, CompressionOptions, ImageCompressor, ImageUpload,
};

/// Downsizes to fit `max_dimension` and re-encodes as JPEG, lowering quality
/// until the output fits `max_size_mb` or the quality floor is reached.
#[derive(Clone, Copy, Debug)]
pub struct JpegCompressor {
    initial_quality: u8,
    min_quality: u8,
    quality_step: u8,
}

impl Default for JpegCompressor {
    fn default() -> Self {
        Self { initial_quality: 90, min_quality: 30, quality_step: 10 }
    }
}

impl JpegCompressor {
    pub fn new() -> Self {
        Self::default()
    }
}

fn fit_within(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return image;
    }
    image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(image)?;
    Ok(bytes)
}

fn jpeg_file_name(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}.jpg")
}

impl ImageCompressor for JpegCompressor {
    fn compress(
        &self,
        image: ImageUpload,
        options: &CompressionOptions,
    ) -> Result<CompressedImage, CompressionError> {
        let decoded = image::load_from_memory(&image.bytes).map_err(|err| {
            CompressionError::Decode { file_name: image.file_name.clone(), reason: err.to_string() }
        })?;
        let rgb = fit_within(decoded, options.max_dimension.max(1)).to_rgb8();
        let limit = options.max_size_bytes();

        let mut quality = self.initial_quality;
        loop {
            let bytes = encode_jpeg(&rgb, quality).map_err(|err| CompressionError::Encode {
                file_name: image.file_name.clone(),
                reason: err.to_string(),
            })?;

            if bytes.len() <= limit || quality <= self.min_quality {
                debug!(
                    file_name = %image.file_name,
                    width = rgb.width(),
                    height = rgb.height(),
                    quality,
                    original_bytes = image.bytes.len(),
                    compressed_bytes = bytes.len(),
                    "image compressed"
                );
                return Ok(CompressedImage { file_name: jpeg_file_name(&image.file_name), bytes });
            }

            quality = quality.saturating_sub(self.quality_step).max(self.min_quality);
        }
    }
}
