use image::{RgbaImage, imageops, imageops::FilterType};
use tracing::{debug, warn};

use super::geometry;
use super::types::{ImageMark, Layout};

/// Render the image watermark onto a transparent overlay of `canvas` size.
///
/// An unset or unreadable mark yields a fully transparent overlay.
pub fn render_image_overlay(canvas: (u32, u32), mark: &ImageMark, layout: &Layout) -> RgbaImage {
    let mut overlay = RgbaImage::new(canvas.0, canvas.1);

    let Some(path) = mark.path.as_deref() else {
        return overlay;
    };
    if !path.exists() {
        debug!("Mark image {:?} does not exist, skipping", path);
        return overlay;
    }

    let source = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            warn!("Failed to load mark image {:?}: {}", path, e);
            return overlay;
        }
    };

    let scaled = prepare_mark(&source, canvas.0, mark.scale_percent, mark.opacity);
    let (x, y) = geometry::resolve(
        canvas,
        scaled.dimensions(),
        layout.anchor,
        layout.offset_x,
        layout.offset_y,
    );
    imageops::overlay(&mut overlay, &scaled, x, y);
    overlay
}

/// Scale the mark to a share of the canvas width and fade its alpha.
pub fn prepare_mark(source: &RgbaImage, canvas_width: u32, scale_percent: u32, opacity: u8) -> RgbaImage {
    let (target_w, target_h) = mark_size(source.dimensions(), canvas_width, scale_percent);
    let mut scaled = if (target_w, target_h) == source.dimensions() {
        source.clone()
    } else {
        imageops::resize(source, target_w, target_h, FilterType::Lanczos3)
    };

    // Multiplies existing transparency rather than overriding it
    let factor = opacity as f32 / 100.0;
    for pixel in scaled.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * factor).min(255.0) as u8;
    }
    scaled
}

/// Target mark dimensions; width follows the canvas, height keeps the aspect ratio.
pub fn mark_size(source: (u32, u32), canvas_width: u32, scale_percent: u32) -> (u32, u32) {
    let scale = scale_percent.max(1) as f64 / 100.0;
    let target_w = ((canvas_width as f64 * scale) as u32).max(1);
    let ratio = target_w as f64 / source.0.max(1) as f64;
    let target_h = ((source.1 as f64 * ratio) as u32).max(1);
    (target_w, target_h)
}
