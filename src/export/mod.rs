// Export pipeline - resize policy, naming, encoding and the batch loop
mod batch;
mod error;
pub mod formats;
pub mod naming;
pub mod resize;

pub use batch::{BatchProgress, BatchSummary, ItemOutcome, export_batch};
pub use error::ExportError;

use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::watermark::ExportRule;

/// Resize, encode and write one composited image into `target_dir`.
///
/// Existing files with the same computed name are overwritten.
pub fn export_image(
    image: RgbaImage,
    source_path: &Path,
    target_dir: &Path,
    rule: &ExportRule,
) -> Result<PathBuf, ExportError> {
    ensure_directory(target_dir)?;

    let out_path = naming::output_path(source_path, target_dir, rule);
    let final_image = resize::resize(image, rule.resize_mode, rule.resize_value);
    debug!(
        "Writing {:?} ({}x{}, {})",
        out_path,
        final_image.width(),
        final_image.height(),
        rule.out_format.tag()
    );

    formats::save(&final_image, &out_path, rule)?;
    Ok(out_path)
}

pub(crate) fn ensure_directory(dir: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Whether `source_path` lives directly in `target_dir`, comparing absolute paths.
pub fn is_source_directory(source_path: &Path, target_dir: &Path) -> bool {
    let source_dir = source_path.parent().unwrap_or(Path::new(""));
    match (absolute(source_dir), absolute(target_dir)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn absolute(path: &Path) -> Option<PathBuf> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    std::path::absolute(path).ok().map(|p| normalize(&p))
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
