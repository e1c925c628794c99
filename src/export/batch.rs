use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::{ExportError, ensure_directory, export_image, is_source_directory};
use crate::watermark::{Compositor, WatermarkConfig};

/// Progress report delivered after each image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Debug)]
pub enum ItemOutcome {
    Exported(PathBuf),
    /// Target directory is the image's own directory
    Refused,
    Failed(ExportError),
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub items: Vec<(PathBuf, ItemOutcome)>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.items.len()
    }

    pub fn exported(&self) -> Vec<&Path> {
        self.items
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                ItemOutcome::Exported(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn refused(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ItemOutcome::Refused))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ItemOutcome::Failed(_)))
            .count()
    }
}

/// Composite and export every source in order, one at a time.
///
/// Per-image failures and source-directory refusals are recorded and skipped;
/// only fatal errors (see [`ExportError::is_fatal`]) abort the batch.
pub fn export_batch<F>(
    compositor: &Compositor,
    sources: &[PathBuf],
    target_dir: &Path,
    config: &WatermarkConfig,
    mut on_progress: F,
) -> Result<BatchSummary, ExportError>
where
    F: FnMut(BatchProgress),
{
    ensure_directory(target_dir)?;

    let total = sources.len();
    let mut summary = BatchSummary::default();

    for (idx, source) in sources.iter().enumerate() {
        let outcome = if is_source_directory(source, target_dir) {
            warn!(
                "Refusing to export {:?} into its source directory {:?}",
                source, target_dir
            );
            ItemOutcome::Refused
        } else {
            match export_one(compositor, source, target_dir, config) {
                Ok(path) => {
                    info!("Exported {:?} -> {:?}", source, path);
                    ItemOutcome::Exported(path)
                }
                Err(e) if e.is_fatal() => {
                    error!("Aborting batch export at {:?}: {}", source, e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to export {:?}: {}", source, e);
                    ItemOutcome::Failed(e)
                }
            }
        };
        summary.items.push((source.clone(), outcome));

        let done = idx + 1;
        on_progress(BatchProgress {
            done,
            total,
            percent: (done * 100 / total) as u8,
        });
    }

    info!(
        "Batch finished: {} attempted, {} exported, {} refused, {} failed",
        summary.attempted(),
        summary.exported().len(),
        summary.refused(),
        summary.failed()
    );
    Ok(summary)
}

fn export_one(
    compositor: &Compositor,
    source: &Path,
    target_dir: &Path,
    config: &WatermarkConfig,
) -> Result<PathBuf, ExportError> {
    let composed = compositor.apply(source, config)?;
    export_image(composed, source, target_dir, &config.export)
}
