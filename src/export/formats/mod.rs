pub mod jpeg;
pub mod png;

use image::RgbaImage;
use std::path::Path;

use super::ExportError;
use crate::watermark::{ExportRule, OutputFormat};

/// Encode in the rule's output format.
pub fn save(image: &RgbaImage, path: &Path, rule: &ExportRule) -> Result<(), ExportError> {
    match rule.out_format {
        OutputFormat::Jpeg => jpeg::save(image, path, rule.jpeg_quality),
        OutputFormat::Png => png::save(image, path),
    }
}
