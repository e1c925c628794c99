use image::{RgbaImage, imageops, imageops::FilterType};
use std::path::Path;

use crate::watermark::{Compositor, WatermarkConfig, WatermarkError};

/// Display boxes this small are treated as not yet laid out.
const MIN_BOX: u32 = 10;
pub const FALLBACK_BOX: (u32, u32) = (800, 600);

/// Composite `path` at native resolution, then shrink the result to fit the display box.
pub fn render_preview(
    compositor: &Compositor,
    path: &Path,
    config: &WatermarkConfig,
    display: (u32, u32),
) -> Result<RgbaImage, WatermarkError> {
    let composed = compositor.apply(path, config)?;
    Ok(fit_to_box(&composed, display))
}

/// Scale down preserving aspect ratio; never scales up.
pub fn fit_to_box(image: &RgbaImage, display: (u32, u32)) -> RgbaImage {
    let (box_w, box_h) = if display.0 <= MIN_BOX || display.1 <= MIN_BOX {
        FALLBACK_BOX
    } else {
        display
    };

    let (w, h) = image.dimensions();
    if w <= box_w && h <= box_h {
        return image.clone();
    }

    let ratio = (box_w as f64 / w as f64).min(box_h as f64 / h as f64);
    let new_w = ((w as f64 * ratio).round() as u32).clamp(1, box_w);
    let new_h = ((h as f64 * ratio).round() as u32).clamp(1, box_h);
    imageops::resize(image, new_w, new_h, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::FontSources;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    #[test]
    fn test_fit_to_box_shrinks_preserving_aspect() {
        let img = RgbaImage::new(1600, 800);
        assert_eq!(fit_to_box(&img, (400, 400)).dimensions(), (400, 200));
        assert_eq!(fit_to_box(&img, (1000, 100)).dimensions(), (200, 100));
    }

    #[test]
    fn test_fit_to_box_never_upscales() {
        let img = RgbaImage::new(120, 80);
        assert_eq!(fit_to_box(&img, (400, 400)).dimensions(), (120, 80));
    }

    #[test]
    fn test_tiny_box_uses_fallback() {
        let img = RgbaImage::new(1600, 1200);
        assert_eq!(fit_to_box(&img, (0, 0)).dimensions(), (800, 600));
        assert_eq!(fit_to_box(&img, (500, 8)).dimensions(), (800, 600));
    }

    #[test]
    fn test_render_preview_fits_composited_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.png");
        ImageBuffer::from_pixel(1000, 500, Rgb([9u8, 9, 9]))
            .save(&path)
            .unwrap();

        let compositor = Compositor::new(FontSources::builtin_only());
        let preview =
            render_preview(&compositor, &path, &WatermarkConfig::default(), (500, 500)).unwrap();
        assert_eq!(preview.dimensions(), (500, 250));
    }
}
