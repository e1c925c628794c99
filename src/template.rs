use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::watermark::{
    Anchor, ExportRule, ImageMark, Layout, NamingMode, OutputFormat, ResizeMode, Rgb, TextStyle,
    WatermarkConfig,
};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDocument {
    pub use_text: bool,
    pub text: TextStyleDocument,
    pub use_image: bool,
    pub image: ImageMarkDocument,
    pub layout: LayoutDocument,
    pub export: ExportRuleDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyleDocument {
    pub text: String,
    pub opacity: i64,
    pub font_path: Option<PathBuf>,
    pub font_size: i64,
    pub stroke: bool,
    pub stroke_width: i64,
    pub stroke_color: Rgb,
    pub fill_color: Rgb,
    pub shadow: bool,
    pub shadow_offset: [i32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageMarkDocument {
    pub path: Option<PathBuf>,
    pub opacity: i64,
    pub scale_percent: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDocument {
    pub anchor: String,
    pub offset_x: i32,
    pub offset_y: i32,
    pub rotation_deg: f32,
    pub allow_drag: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRuleDocument {
    pub mode: String,
    pub text: String,
    pub out_format: String,
    pub jpeg_quality: i64,
    pub resize_mode: String,
    pub resize_value: i64,
}

impl Default for TemplateDocument {
    fn default() -> Self {
        Self::from(&WatermarkConfig::default())
    }
}

impl Default for TextStyleDocument {
    fn default() -> Self {
        Self::from(&TextStyle::default())
    }
}

impl Default for ImageMarkDocument {
    fn default() -> Self {
        Self::from(&ImageMark::default())
    }
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self::from(&Layout::default())
    }
}

impl Default for ExportRuleDocument {
    fn default() -> Self {
        Self::from(&ExportRule::default())
    }
}

// Out-of-range numbers are pinned to the field's range instead of rejecting the file
fn saturate_u8(value: i64) -> u8 {
    value.clamp(0, u8::MAX.into()) as u8
}

fn saturate_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX.into()) as u32
}

impl From<&WatermarkConfig> for TemplateDocument {
    fn from(config: &WatermarkConfig) -> Self {
        Self {
            use_text: config.use_text,
            text: TextStyleDocument::from(&config.text),
            use_image: config.use_image,
            image: ImageMarkDocument::from(&config.image),
            layout: LayoutDocument::from(&config.layout),
            export: ExportRuleDocument::from(&config.export),
        }
    }
}

impl From<&TextStyle> for TextStyleDocument {
    fn from(style: &TextStyle) -> Self {
        Self {
            text: style.text.clone(),
            opacity: style.opacity.into(),
            font_path: style.font_path.clone(),
            font_size: style.font_size.into(),
            stroke: style.stroke,
            stroke_width: style.stroke_width.into(),
            stroke_color: style.stroke_color,
            fill_color: style.fill_color,
            shadow: style.shadow,
            shadow_offset: [style.shadow_offset.0, style.shadow_offset.1],
        }
    }
}

impl From<&ImageMark> for ImageMarkDocument {
    fn from(mark: &ImageMark) -> Self {
        Self {
            path: mark.path.clone(),
            opacity: mark.opacity.into(),
            scale_percent: mark.scale_percent.into(),
        }
    }
}

impl From<&Layout> for LayoutDocument {
    fn from(layout: &Layout) -> Self {
        Self {
            anchor: layout.anchor.tag().to_string(),
            offset_x: layout.offset_x,
            offset_y: layout.offset_y,
            rotation_deg: layout.rotation_deg,
            allow_drag: layout.allow_drag,
        }
    }
}

impl From<&ExportRule> for ExportRuleDocument {
    fn from(rule: &ExportRule) -> Self {
        Self {
            mode: rule.mode.tag().to_string(),
            text: rule.text.clone(),
            out_format: rule.out_format.tag().to_string(),
            jpeg_quality: rule.jpeg_quality.into(),
            resize_mode: rule.resize_mode.tag().to_string(),
            resize_value: rule.resize_value.into(),
        }
    }
}

impl From<TemplateDocument> for WatermarkConfig {
    fn from(doc: TemplateDocument) -> Self {
        Self {
            use_text: doc.use_text,
            text: doc.text.into(),
            use_image: doc.use_image,
            image: doc.image.into(),
            layout: doc.layout.into(),
            export: doc.export.into(),
        }
    }
}

impl From<TextStyleDocument> for TextStyle {
    fn from(doc: TextStyleDocument) -> Self {
        Self {
            text: doc.text,
            opacity: saturate_u8(doc.opacity),
            font_path: doc.font_path,
            font_size: saturate_u32(doc.font_size),
            stroke: doc.stroke,
            stroke_width: saturate_u32(doc.stroke_width),
            stroke_color: doc.stroke_color,
            fill_color: doc.fill_color,
            shadow: doc.shadow,
            shadow_offset: (doc.shadow_offset[0], doc.shadow_offset[1]),
        }
    }
}

impl From<ImageMarkDocument> for ImageMark {
    fn from(doc: ImageMarkDocument) -> Self {
        Self {
            path: doc.path,
            opacity: saturate_u8(doc.opacity),
            scale_percent: saturate_u32(doc.scale_percent),
        }
    }
}

impl From<LayoutDocument> for Layout {
    fn from(doc: LayoutDocument) -> Self {
        // Unknown anchors resolve to the origin, same as top-left
        let anchor = Anchor::from_tag(&doc.anchor).unwrap_or_else(|| {
            warn!("Unknown anchor {:?}, placing at top-left", doc.anchor);
            Anchor::TopLeft
        });
        Self {
            anchor,
            offset_x: doc.offset_x,
            offset_y: doc.offset_y,
            rotation_deg: doc.rotation_deg,
            allow_drag: doc.allow_drag,
        }
    }
}

impl From<ExportRuleDocument> for ExportRule {
    fn from(doc: ExportRuleDocument) -> Self {
        Self {
            mode: NamingMode::from_tag(&doc.mode),
            text: doc.text,
            out_format: OutputFormat::from_tag(&doc.out_format),
            jpeg_quality: saturate_u8(doc.jpeg_quality),
            resize_mode: ResizeMode::from_tag(&doc.resize_mode),
            resize_value: saturate_u32(doc.resize_value),
        }
    }
}

pub fn to_json(config: &WatermarkConfig) -> Result<String, TemplateError> {
    Ok(serde_json::to_string_pretty(&TemplateDocument::from(config))?)
}

pub fn from_json(json: &str) -> Result<WatermarkConfig, TemplateError> {
    let doc: TemplateDocument = serde_json::from_str(json)?;
    Ok(doc.into())
}

/// Write a named template file.
pub fn save_template(path: &Path, config: &WatermarkConfig) -> Result<(), TemplateError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_json(config)?)?;
    debug!("Saved template to {:?}", path);
    Ok(())
}

/// Read a named template file.
pub fn load_template(path: &Path) -> Result<WatermarkConfig, TemplateError> {
    let content = std::fs::read_to_string(path)?;
    from_json(&content)
}

/// Read the session-state file; absence or parse failure means "no prior state".
pub fn load_state(path: &Path) -> Option<WatermarkConfig> {
    if !path.exists() {
        return None;
    }
    match load_template(path) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Ignoring unreadable session state {:?}: {}", path, e);
            None
        }
    }
}
