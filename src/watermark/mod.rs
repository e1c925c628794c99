// Watermark compositing pipeline - data model, placement, overlay rendering
mod compositor;
mod error;
pub mod font;
pub mod geometry;
pub mod mark;
pub mod text;
mod types;

pub use compositor::Compositor;
pub(crate) use compositor::open_image;
pub use error::WatermarkError;
pub use font::FontSources;
pub use types::{
    Anchor, ExportRule, ImageMark, Layout, NamingMode, OutputFormat, ResizeMode, Rgb, TextStyle,
    WatermarkConfig, percent_alpha,
};
