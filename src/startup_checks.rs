use crate::Config;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create directory {0:?}: {1}")]
    DirectoryCreationFailed(PathBuf, std::io::Error),
}

/// Create the working directories and report which fonts are reachable.
pub fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    for dir in [&config.paths.export_dir, &config.paths.templates_dir] {
        if dir.exists() {
            info!("Directory exists: {:?}", dir);
            continue;
        }
        info!("Directory does not exist, creating: {:?}", dir);
        if let Err(e) = std::fs::create_dir_all(dir) {
            error!("Failed to create directory {:?}: {}", dir, e);
            errors.push(StartupCheckError::DirectoryCreationFailed(dir.clone(), e));
        }
    }

    let sources = config.font_sources();
    match sources.bundled.as_ref().filter(|p| p.exists()) {
        Some(path) => info!("Bundled font found: {:?}", path),
        None => {
            let system = sources.system.iter().find(|p| p.exists());
            match system {
                Some(path) => info!("No bundled font, using system font {:?}", path),
                None => warn!("No font files found, text watermarks use the built-in bitmap font"),
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.export_dir = temp_dir.path().join("exports");
        config.paths.templates_dir = temp_dir.path().join("templates");

        perform_startup_checks(&config).unwrap();
        assert!(config.paths.export_dir.is_dir());
        assert!(config.paths.templates_dir.is_dir());
    }

    #[test]
    fn test_reports_uncreatable_directory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let mut config = Config::default();
        config.paths.export_dir = blocker.join("exports");
        config.paths.templates_dir = temp_dir.path().join("templates");

        let errors = perform_startup_checks(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
