use image::{DynamicImage, ImageEncoder, RgbImage, RgbaImage, codecs::jpeg::JpegEncoder};
use std::path::Path;
use tracing::debug;

use crate::export::ExportError;

/// Discard the alpha channel; color channels are kept as they are.
pub fn flatten(image: &RgbaImage) -> RgbImage {
    DynamicImage::ImageRgba8(image.clone()).to_rgb8()
}

/// Save as an opaque three-channel JPEG.
///
/// The encoder writes every component at full resolution (4:4:4), so chroma
/// is never subsampled.
pub fn save(image: &RgbaImage, path: &Path, quality: u8) -> Result<(), ExportError> {
    let rgb_image = flatten(image);
    let quality = quality.clamp(1, 100);
    let output = std::fs::File::create(path)?;

    let encoder = JpegEncoder::new_with_quality(output, quality);
    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    debug!("JPEG written to {:?} at quality {}", path, quality);

    Ok(())
}
