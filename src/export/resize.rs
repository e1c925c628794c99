use image::{RgbaImage, imageops, imageops::FilterType};

use crate::watermark::ResizeMode;

/// Export-time target dimensions for `mode`, or `None` when the image is kept as is.
pub fn target_size(size: (u32, u32), mode: ResizeMode, value: u32) -> Option<(u32, u32)> {
    let (w, h) = (size.0 as u64, size.1 as u64);
    if w == 0 || h == 0 {
        return None;
    }

    match mode {
        ResizeMode::None => None,
        ResizeMode::ByWidth => {
            let new_w = value.max(1) as u64;
            let new_h = (h * new_w / w).max(1);
            Some((new_w as u32, new_h as u32))
        }
        ResizeMode::ByHeight => {
            let new_h = value.max(1) as u64;
            let new_w = (w * new_h / h).max(1);
            Some((new_w as u32, new_h as u32))
        }
        ResizeMode::ByPercent => {
            let percent = value.max(1) as u64;
            let new_w = (w * percent / 100).max(1);
            let new_h = (h * percent / 100).max(1);
            Some((new_w as u32, new_h as u32))
        }
    }
}

/// Apply the resize policy with Lanczos resampling.
pub fn resize(image: RgbaImage, mode: ResizeMode, value: u32) -> RgbaImage {
    match target_size(image.dimensions(), mode, value) {
        Some((w, h)) if (w, h) != image.dimensions() => {
            imageops::resize(&image, w, h, FilterType::Lanczos3)
        }
        _ => image,
    }
}
