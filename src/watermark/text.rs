use image::{GrayImage, Rgba, RgbaImage, imageops};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use tracing::debug;

use super::font::{FontSources, WatermarkFont, best_available, provider_chain};
use super::geometry;
use super::types::{Layout, TextStyle};

/// Transparent margin around the text on each side of the transient layer.
const MARGIN: u32 = 10;
const SHADOW_BLUR_SIGMA: f32 = 1.0;
const MIN_ROTATION_DEG: f32 = 1e-3;
/// Widest stroke drawn; larger stored widths render at this width.
const MAX_STROKE_WIDTH: u32 = 256;

/// Render the text watermark onto a transparent overlay the size of `canvas`.
pub fn render_text_overlay(
    canvas: (u32, u32),
    style: &TextStyle,
    layout: &Layout,
    sources: &FontSources,
) -> RgbaImage {
    let chain = provider_chain(style.font_path.as_deref(), sources);
    let font = best_available(&chain, style.font_size);

    let block = render_text_block(style, layout.rotation_deg, &font);
    let (x, y) = geometry::resolve(
        canvas,
        block.dimensions(),
        layout.anchor,
        layout.offset_x,
        layout.offset_y,
    );
    debug!(
        "Placing {}x{} text block at ({}, {})",
        block.width(),
        block.height(),
        x,
        y
    );

    let mut overlay = RgbaImage::new(canvas.0, canvas.1);
    imageops::overlay(&mut overlay, &block, x, y);
    overlay
}

/// Render the styled, possibly rotated text into its own tightly sized layer.
pub fn render_text_block(style: &TextStyle, rotation_deg: f32, font: &WatermarkFont) -> RgbaImage {
    let stroke_width = style.effective_stroke_width().min(MAX_STROKE_WIDTH);
    let padding = 2 * stroke_width + 2 * MARGIN;
    let (text_w, text_h) = font.measure(&style.text);
    let width = text_w.saturating_add(padding);
    let height = text_h.saturating_add(padding);
    let origin = (MARGIN + stroke_width) as i32;
    let alpha = style.alpha();

    let mut layer = RgbaImage::new(width, height);

    // The blur must run before the main text is drawn so it only softens the shadow
    if style.shadow {
        let (sx, sy) = style.shadow_offset;
        let mut shadow = GrayImage::new(width, height);
        font.rasterize(&mut shadow, &style.text, origin + sx, origin + sy);
        paint(&mut layer, &shadow, Rgba([0, 0, 0, alpha]));
        layer = gaussian_blur_f32(&layer, SHADOW_BLUR_SIGMA);
    }

    let mut glyphs = GrayImage::new(width, height);
    font.rasterize(&mut glyphs, &style.text, origin, origin);

    if stroke_width > 0 {
        let outline = dilate_coverage(&glyphs, stroke_width);
        let [r, g, b] = style.stroke_color;
        paint(&mut layer, &outline, Rgba([r, g, b, alpha]));
    }

    let [r, g, b] = style.fill_color;
    paint(&mut layer, &glyphs, Rgba([r, g, b, alpha]));

    if rotation_deg.abs() > MIN_ROTATION_DEG {
        layer = rotate_expanded(&layer, rotation_deg);
    }

    layer
}

/// Write `ink` through a coverage mask, replacing (not blending over) the
/// existing pixel in proportion to coverage.
fn paint(layer: &mut RgbaImage, mask: &GrayImage, ink: Rgba<u8>) {
    for (pixel, coverage) in layer.pixels_mut().zip(mask.pixels()) {
        let c = coverage[0] as u32;
        if c == 0 {
            continue;
        }
        for channel in 0..4 {
            let old = pixel[channel] as u32;
            pixel[channel] = ((ink[channel] as u32 * c + old * (255 - c) + 127) / 255) as u8;
        }
    }
}

/// Grayscale dilation with a disk of `radius`, used to grow glyph coverage into a stroke.
fn dilate_coverage(mask: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    let r = radius as i64;
    let offsets: Vec<(i64, i64)> = (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
        .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
        .collect();

    let mut out = GrayImage::new(width, height);
    for (x, y, src) in mask.enumerate_pixels() {
        if src[0] == 0 {
            continue;
        }
        for (dx, dy) in &offsets {
            let (tx, ty) = (x as i64 + dx, y as i64 + dy);
            if tx < 0 || ty < 0 || tx >= width as i64 || ty >= height as i64 {
                continue;
            }
            let target = out.get_pixel_mut(tx as u32, ty as u32);
            if src[0] > target[0] {
                target[0] = src[0];
            }
        }
    }
    out
}

/// Rotate counter-clockwise, growing the canvas so no corner is clipped.
fn rotate_expanded(layer: &RgbaImage, degrees: f32) -> RgbaImage {
    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (w, h) = (layer.width() as f32, layer.height() as f32);

    // Trim float noise so exact right angles don't gain a pixel
    let new_w = ((w * cos.abs() + h * sin.abs()) - 1e-3).ceil().max(1.0) as u32;
    let new_h = ((w * sin.abs() + h * cos.abs()) - 1e-3).ceil().max(1.0) as u32;

    let mut expanded = RgbaImage::new(new_w, new_h);
    let x = (new_w as i64 - layer.width() as i64).div_euclid(2);
    let y = (new_h as i64 - layer.height() as i64).div_euclid(2);
    imageops::replace(&mut expanded, layer, x, y);

    // imageproc rotates clockwise in image coordinates
    rotate_about_center(&expanded, -theta, Interpolation::Bicubic, Rgba([0, 0, 0, 0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::types::Anchor;

    fn plain_style() -> TextStyle {
        TextStyle {
            text: "AB".to_string(),
            opacity: 100,
            font_size: 8,
            stroke: false,
            shadow: false,
            ..TextStyle::default()
        }
    }

    #[test]
    fn test_block_size_includes_margin_and_stroke() {
        let font = WatermarkFont::builtin(8);

        let block = render_text_block(&plain_style(), 0.0, &font);
        assert_eq!(block.dimensions(), (16 + 20, 8 + 20));

        let stroked = TextStyle {
            stroke: true,
            stroke_width: 3,
            ..plain_style()
        };
        let block = render_text_block(&stroked, 0.0, &font);
        assert_eq!(block.dimensions(), (16 + 6 + 20, 8 + 6 + 20));
    }

    #[test]
    fn test_huge_stroke_width_is_bounded() {
        let font = WatermarkFont::builtin(8);
        let style = TextStyle {
            text: String::new(),
            stroke: true,
            stroke_width: u32::MAX,
            ..plain_style()
        };

        let block = render_text_block(&style, 0.0, &font);
        let side = 2 * MAX_STROKE_WIDTH + 2 * MARGIN;
        assert_eq!(block.dimensions(), (side, side));
    }

    #[test]
    fn test_fill_alpha_is_replaced_not_blended() {
        let font = WatermarkFont::builtin(8);
        let style = TextStyle {
            opacity: 40,
            fill_color: [200, 10, 20],
            ..plain_style()
        };
        let block = render_text_block(&style, 0.0, &font);

        let alphas: Vec<u8> = block.pixels().map(|p| p[3]).filter(|a| *a > 0).collect();
        assert!(!alphas.is_empty());
        // Bitmap glyphs have full coverage, so every lit pixel carries exactly the style alpha
        assert!(alphas.iter().all(|a| *a == 102));
        assert!(
            block
                .pixels()
                .filter(|p| p[3] > 0)
                .all(|p| p[0] == 200 && p[1] == 10 && p[2] == 20)
        );
    }

    #[test]
    fn test_stroke_surrounds_fill() {
        let font = WatermarkFont::builtin(8);
        let style = TextStyle {
            stroke: true,
            stroke_width: 2,
            stroke_color: [0, 0, 255],
            fill_color: [255, 0, 0],
            ..plain_style()
        };
        let block = render_text_block(&style, 0.0, &font);

        let stroke_pixels = block.pixels().filter(|p| p[3] > 0 && p[2] == 255).count();
        let fill_pixels = block.pixels().filter(|p| p[3] > 0 && p[0] == 255).count();
        assert!(stroke_pixels > 0);
        assert!(fill_pixels > 0);
    }

    #[test]
    fn test_shadow_is_blurred_but_text_is_crisp() {
        let font = WatermarkFont::builtin(8);
        let style = TextStyle {
            shadow: true,
            shadow_offset: (3, 3),
            fill_color: [255, 255, 255],
            ..plain_style()
        };
        let block = render_text_block(&style, 0.0, &font);

        // Blurred shadow leaves partial alpha somewhere
        assert!(block.pixels().any(|p| p[3] > 0 && p[3] < 255));
        // Main glyph pixels stay fully opaque white
        let mut glyphs = GrayImage::new(block.width(), block.height());
        font.rasterize(&mut glyphs, "AB", MARGIN as i32, MARGIN as i32);
        for (x, y, c) in glyphs.enumerate_pixels() {
            if c[0] == 255 {
                assert_eq!(block.get_pixel(x, y), &Rgba([255, 255, 255, 255]));
            }
        }
    }

    #[test]
    fn test_rotation_expands_layer() {
        let font = WatermarkFont::builtin(8);
        let flat = render_text_block(&plain_style(), 0.0, &font);
        let turned = render_text_block(&plain_style(), 90.0, &font);
        assert_eq!(turned.dimensions(), (flat.height(), flat.width()));

        let tilted = render_text_block(&plain_style(), 30.0, &font);
        assert!(tilted.width() > flat.width());
        assert!(tilted.height() > flat.height());
    }

    #[test]
    fn test_negligible_rotation_is_ignored() {
        let font = WatermarkFont::builtin(8);
        let flat = render_text_block(&plain_style(), 0.0, &font);
        let nearly = render_text_block(&plain_style(), 0.0005, &font);
        assert_eq!(flat, nearly);
    }

    #[test]
    fn test_overlay_is_canvas_sized_and_placed() {
        let style = plain_style();
        let layout = Layout {
            anchor: Anchor::TopLeft,
            ..Layout::default()
        };
        let overlay =
            render_text_overlay((200, 100), &style, &layout, &FontSources::builtin_only());
        assert_eq!(overlay.dimensions(), (200, 100));

        // Everything drawn lives inside the block at the top-left corner
        for (x, y, p) in overlay.enumerate_pixels() {
            if p[3] > 0 {
                assert!(x < 36 && y < 28, "pixel at ({}, {})", x, y);
            }
        }
        assert!(overlay.pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn test_overlay_outside_canvas_is_clipped() {
        let layout = Layout {
            anchor: Anchor::TopLeft,
            offset_x: 5000,
            ..Layout::default()
        };
        let overlay =
            render_text_overlay((50, 50), &plain_style(), &layout, &FontSources::builtin_only());
        assert!(overlay.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_dilate_grows_coverage() {
        let mut mask = GrayImage::new(9, 9);
        mask.put_pixel(4, 4, image::Luma([255]));
        let grown = dilate_coverage(&mask, 2);
        assert_eq!(grown.get_pixel(6, 4)[0], 255);
        assert_eq!(grown.get_pixel(4, 2)[0], 255);
        // Disk, not square
        assert_eq!(grown.get_pixel(6, 6)[0], 0);
    }
}
