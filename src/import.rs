use image::RgbaImage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::watermark::WatermarkError;

pub const SUPPORTED_INPUTS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Case-insensitive extension check against the supported input list.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_INPUTS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Expand files and directories into supported images, recursing into
/// directories in file-name order.
pub fn discover(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for input in inputs {
        collect(input, &mut found);
    }
    dedup_preserving_order(found)
}

fn collect(input: &Path, found: &mut Vec<PathBuf>) {
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_image_file(entry.path()) => {
                    found.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry under {:?}: {}", input, e),
            }
        }
    } else if input.is_file() && is_image_file(input) {
        found.push(input.to_path_buf());
    } else {
        debug!("Ignoring unsupported input {:?}", input);
    }
}

fn dedup_preserving_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// A small preview of an imported image.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub image: RgbaImage,
}

/// Ordered, de-duplicated list of images awaiting export.
#[derive(Debug, Clone, Default)]
pub struct ImageList {
    paths: Vec<PathBuf>,
    selected: Option<usize>,
}

impl ImageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add files or directories; duplicates of already-listed paths are dropped.
    pub fn add(&mut self, inputs: &[PathBuf]) -> usize {
        let before = self.paths.len();
        let mut combined = std::mem::take(&mut self.paths);
        combined.extend(discover(inputs));
        self.paths = dedup_preserving_order(combined);
        self.paths.len() - before
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.paths.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// The selected image, or the first one when nothing is selected.
    pub fn current(&self) -> Option<&Path> {
        self.selected
            .and_then(|idx| self.paths.get(idx))
            .or_else(|| self.paths.first())
            .map(PathBuf::as_path)
    }

    /// Thumbnails for every listed image; images that fail to decode are skipped.
    pub fn thumbnails(&self, size: u32) -> Vec<Thumbnail> {
        self.paths
            .iter()
            .filter_map(|path| match thumbnail(path, size) {
                Ok(image) => Some(Thumbnail {
                    path: path.clone(),
                    image,
                }),
                Err(e) => {
                    warn!("Skipping thumbnail for {:?}: {}", path, e);
                    None
                }
            })
            .collect()
    }
}

/// Decode and shrink an image to fit in a `size` x `size` box.
pub fn thumbnail(path: &Path, size: u32) -> Result<RgbaImage, WatermarkError> {
    let img = crate::watermark::open_image(path)?;
    if img.width() <= size && img.height() <= size {
        return Ok(img.to_rgba8());
    }
    Ok(img.thumbnail(size, size).to_rgba8())
}
