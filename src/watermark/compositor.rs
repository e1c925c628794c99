use image::{DynamicImage, RgbaImage, imageops};
use std::path::Path;
use tracing::debug;

use super::error::WatermarkError;
use super::font::FontSources;
use super::mark::render_image_overlay;
use super::text::render_text_overlay;
use super::types::WatermarkConfig;

/// Applies a configuration's overlays to base images.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    fonts: FontSources,
}

impl Compositor {
    pub fn new(fonts: FontSources) -> Self {
        Self { fonts }
    }

    /// Open `base_path` at native resolution and composite the enabled overlays.
    pub fn apply(&self, base_path: &Path, config: &WatermarkConfig) -> Result<RgbaImage, WatermarkError> {
        let base = open_image(base_path)?;
        debug!(
            "Compositing {:?} ({}x{})",
            base_path,
            base.width(),
            base.height()
        );
        Ok(self.apply_to_image(&base, config))
    }

    /// Text overlay first, image overlay on top.
    pub fn apply_to_image(&self, base: &DynamicImage, config: &WatermarkConfig) -> RgbaImage {
        let mut canvas = base.to_rgba8();
        let size = canvas.dimensions();

        if config.use_text {
            let overlay = render_text_overlay(size, &config.text, &config.layout, &self.fonts);
            imageops::overlay(&mut canvas, &overlay, 0, 0);
        }

        if config.use_image {
            let overlay = render_image_overlay(size, &config.image, &config.layout);
            imageops::overlay(&mut canvas, &overlay, 0, 0);
        }

        canvas
    }
}

/// Decode an image, detecting the format from its contents.
pub(crate) fn open_image(path: &Path) -> Result<DynamicImage, WatermarkError> {
    let file = std::fs::File::open(path)?;
    let reader = image::ImageReader::new(std::io::BufReader::new(file)).with_guessed_format()?;
    Ok(reader.decode()?)
}
