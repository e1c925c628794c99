use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::watermark::WatermarkError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Watermark error: {0}")]
    WatermarkError(#[from] WatermarkError),
}

impl ExportError {
    /// Errors that should abort a whole batch rather than skip one image.
    pub fn is_fatal(&self) -> bool {
        match self {
            ExportError::CreateDirectory { .. } => true,
            ExportError::IoError(e) => e.kind() == ErrorKind::StorageFull,
            ExportError::ImageError(image::ImageError::IoError(e)) => {
                e.kind() == ErrorKind::StorageFull
            }
            _ => false,
        }
    }
}
