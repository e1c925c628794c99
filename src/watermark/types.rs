use std::path::PathBuf;

/// RGB color triple, stored on disk as a 3-element array.
pub type Rgb = [u8; 3];

/// Full watermark configuration applied uniformly to every image in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkConfig {
    pub use_text: bool,
    pub text: TextStyle,
    pub use_image: bool,
    pub image: ImageMark,
    pub layout: Layout,
    pub export: ExportRule,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            use_text: true,
            text: TextStyle::default(),
            use_image: false,
            image: ImageMark::default(),
            layout: Layout::default(),
            export: ExportRule::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub text: String,
    /// Percentage of full alpha (0-100)
    pub opacity: u8,
    pub font_path: Option<PathBuf>,
    pub font_size: u32,
    pub stroke: bool,
    pub stroke_width: u32,
    pub stroke_color: Rgb,
    pub fill_color: Rgb,
    pub shadow: bool,
    pub shadow_offset: (i32, i32),
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: "Sample Watermark".to_string(),
            opacity: 40,
            font_path: None,
            font_size: 36,
            stroke: true,
            stroke_width: 2,
            stroke_color: [0, 0, 0],
            fill_color: [255, 255, 255],
            shadow: true,
            shadow_offset: (2, 2),
        }
    }
}

impl TextStyle {
    /// Alpha baked into fill, stroke and shadow pixels.
    pub fn alpha(&self) -> u8 {
        percent_alpha(self.opacity)
    }

    pub(crate) fn effective_stroke_width(&self) -> u32 {
        if self.stroke { self.stroke_width } else { 0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageMark {
    pub path: Option<PathBuf>,
    pub opacity: u8,
    /// Mark width as a percentage of the target canvas width
    pub scale_percent: u32,
}

impl Default for ImageMark {
    fn default() -> Self {
        Self {
            path: None,
            opacity: 40,
            scale_percent: 30,
        }
    }
}

/// Nine-zone placement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    TopLeft,
    TopMiddle,
    TopRight,
    MiddleLeft,
    #[default]
    Center,
    MiddleRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopMiddle,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Center,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomMiddle,
        Anchor::BottomRight,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "tl" => Some(Anchor::TopLeft),
            "tm" => Some(Anchor::TopMiddle),
            "tr" => Some(Anchor::TopRight),
            "ml" => Some(Anchor::MiddleLeft),
            "center" => Some(Anchor::Center),
            "mr" => Some(Anchor::MiddleRight),
            "bl" => Some(Anchor::BottomLeft),
            "bm" => Some(Anchor::BottomMiddle),
            "br" => Some(Anchor::BottomRight),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "tl",
            Anchor::TopMiddle => "tm",
            Anchor::TopRight => "tr",
            Anchor::MiddleLeft => "ml",
            Anchor::Center => "center",
            Anchor::MiddleRight => "mr",
            Anchor::BottomLeft => "bl",
            Anchor::BottomMiddle => "bm",
            Anchor::BottomRight => "br",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub anchor: Anchor,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Counter-clockwise, degrees
    pub rotation_deg: f32,
    /// Only consulted by interactive preview repositioning
    pub allow_drag: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            anchor: Anchor::Center,
            offset_x: 0,
            offset_y: 0,
            rotation_deg: 0.0,
            allow_drag: true,
        }
    }
}

impl Layout {
    /// Move the watermark by a pointer delta. Returns false when dragging is disabled.
    pub fn drag_by(&mut self, dx: i32, dy: i32) -> bool {
        if !self.allow_drag {
            return false;
        }
        self.offset_x = self.offset_x.saturating_add(dx);
        self.offset_y = self.offset_y.saturating_add(dy);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingMode {
    #[default]
    Keep,
    Prefix,
    Suffix,
}

impl NamingMode {
    /// Unknown tags behave like `keep`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "prefix" => NamingMode::Prefix,
            "suffix" => NamingMode::Suffix,
            _ => NamingMode::Keep,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NamingMode::Keep => "keep",
            NamingMode::Prefix => "prefix",
            NamingMode::Suffix => "suffix",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Anything other than `JPEG` is written as PNG.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "JPEG" => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    #[default]
    None,
    ByWidth,
    ByHeight,
    ByPercent,
}

impl ResizeMode {
    /// Unknown tags leave the image untouched.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "by_width" => ResizeMode::ByWidth,
            "by_height" => ResizeMode::ByHeight,
            "by_percent" => ResizeMode::ByPercent,
            _ => ResizeMode::None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ResizeMode::None => "none",
            ResizeMode::ByWidth => "by_width",
            ResizeMode::ByHeight => "by_height",
            ResizeMode::ByPercent => "by_percent",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRule {
    pub mode: NamingMode,
    /// Prefix or suffix fragment, depending on `mode`
    pub text: String,
    pub out_format: OutputFormat,
    pub jpeg_quality: u8,
    pub resize_mode: ResizeMode,
    pub resize_value: u32,
}

impl Default for ExportRule {
    fn default() -> Self {
        Self {
            mode: NamingMode::Keep,
            text: String::new(),
            out_format: OutputFormat::Png,
            jpeg_quality: 90,
            resize_mode: ResizeMode::None,
            resize_value: 100,
        }
    }
}

/// `round(255 * percent / 100)`, saturating for out-of-range percentages.
pub fn percent_alpha(percent: u8) -> u8 {
    (255.0 * percent as f32 / 100.0).round().min(255.0) as u8
}
