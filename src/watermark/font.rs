use ab_glyph::{FontVec, PxScale};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where fonts may come from, in addition to the style's explicit font path.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSources {
    /// Font shipped next to the application
    pub bundled: Option<PathBuf>,
    /// Platform font files, tried in order
    pub system: Vec<PathBuf>,
}

impl Default for FontSources {
    fn default() -> Self {
        Self {
            bundled: Some(PathBuf::from("font.ttf")),
            system: default_system_fonts(),
        }
    }
}

impl FontSources {
    /// Only the built-in bitmap font is reachable.
    pub fn builtin_only() -> Self {
        Self {
            bundled: None,
            system: Vec::new(),
        }
    }
}

pub fn default_system_fonts() -> Vec<PathBuf> {
    [
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

/// A font able to measure text and rasterize it into a coverage mask.
pub enum WatermarkFont {
    Outline { font: FontVec, scale: PxScale },
    Bitmap { scale: u32 },
}

impl std::fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatermarkFont::Outline { scale, .. } => {
                write!(f, "Outline({}px)", scale.y)
            }
            WatermarkFont::Bitmap { scale } => write!(f, "Bitmap(x{})", scale),
        }
    }
}

const BITMAP_GLYPH: u32 = 8;

impl WatermarkFont {
    /// The 8x8 font scaled up to roughly `size` pixels.
    pub fn builtin(size: u32) -> Self {
        WatermarkFont::Bitmap {
            scale: (size / BITMAP_GLYPH).max(1),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, WatermarkFont::Bitmap { .. })
    }

    /// Rendered text extent in pixels.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            WatermarkFont::Outline { font, scale } => text_size(*scale, font, text),
            WatermarkFont::Bitmap { scale } => {
                let count = text.chars().count() as u32;
                if count == 0 {
                    return (0, 0);
                }
                let glyph = BITMAP_GLYPH.saturating_mul(*scale);
                (count.saturating_mul(glyph), glyph)
            }
        }
    }

    /// Draw full-coverage text into `mask` with its top-left at `(x, y)`.
    pub fn rasterize(&self, mask: &mut GrayImage, text: &str, x: i32, y: i32) {
        match self {
            WatermarkFont::Outline { font, scale } => {
                draw_text_mut(mask, Luma([255u8]), x, y, *scale, font, text);
            }
            WatermarkFont::Bitmap { scale } => rasterize_bitmap(mask, text, x, y, *scale),
        }
    }
}

fn rasterize_bitmap(mask: &mut GrayImage, text: &str, x: i32, y: i32, scale: u32) {
    let (width, height) = (mask.width() as i64, mask.height() as i64);
    let step = (BITMAP_GLYPH * scale) as i64;

    for (idx, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin_x = x as i64 + idx as i64 * step;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BITMAP_GLYPH {
                if (*bits >> col) & 1 == 0 {
                    continue;
                }
                let base_x = origin_x + (col * scale) as i64;
                let base_y = y as i64 + row as i64 * scale as i64;
                for dy in 0..scale as i64 {
                    for dx in 0..scale as i64 {
                        let (px, py) = (base_x + dx, base_y + dy);
                        if px >= 0 && py >= 0 && px < width && py < height {
                            mask.put_pixel(px as u32, py as u32, Luma([255]));
                        }
                    }
                }
            }
        }
    }
}

/// One step of the font fallback chain.
pub trait FontProvider {
    fn name(&self) -> &str;
    fn provide(&self, size: u32) -> Option<WatermarkFont>;
}

/// Reads a TrueType/OpenType file if it exists and parses.
pub struct FileFont {
    label: &'static str,
    path: PathBuf,
}

impl FileFont {
    pub fn new(label: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            label,
            path: path.into(),
        }
    }
}

impl FontProvider for FileFont {
    fn name(&self) -> &str {
        self.label
    }

    fn provide(&self, size: u32) -> Option<WatermarkFont> {
        load_font_file(&self.path, size)
    }
}

pub struct BuiltinFont;

impl FontProvider for BuiltinFont {
    fn name(&self) -> &str {
        "builtin"
    }

    fn provide(&self, size: u32) -> Option<WatermarkFont> {
        Some(WatermarkFont::builtin(size))
    }
}

fn load_font_file(path: &Path, size: u32) -> Option<WatermarkFont> {
    if !path.exists() {
        return None;
    }

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!("Failed to read font {:?}: {}", path, e);
            return None;
        }
    };

    match FontVec::try_from_vec(data) {
        Ok(font) => Some(WatermarkFont::Outline {
            font,
            scale: PxScale::from(size.max(1) as f32),
        }),
        Err(_) => {
            debug!("Failed to parse font {:?}", path);
            None
        }
    }
}

/// Ordered provider list: explicit path, bundled font, system fonts, built-in bitmap.
pub fn provider_chain(explicit: Option<&Path>, sources: &FontSources) -> Vec<Box<dyn FontProvider>> {
    let mut chain: Vec<Box<dyn FontProvider>> = Vec::new();
    if let Some(path) = explicit {
        chain.push(Box::new(FileFont::new("explicit", path)));
    }
    if let Some(bundled) = &sources.bundled {
        chain.push(Box::new(FileFont::new("bundled", bundled)));
    }
    for path in &sources.system {
        chain.push(Box::new(FileFont::new("system", path)));
    }
    chain.push(Box::new(BuiltinFont));
    chain
}

/// First font any provider can supply. Never fails.
pub fn best_available(providers: &[Box<dyn FontProvider>], size: u32) -> WatermarkFont {
    for provider in providers {
        if let Some(font) = provider.provide(size) {
            debug!("Using {} font: {:?}", provider.name(), font);
            return font;
        }
    }
    WatermarkFont::builtin(size)
}
