use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod export;
pub mod import;
pub mod preview;
pub mod session;
pub mod startup_checks;
pub mod template;
pub mod watermark;

use watermark::{Compositor, FontSources};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub fonts: FontsConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Session state, rewritten after every edit
    pub state_file: PathBuf,
    pub templates_dir: PathBuf,
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Font shipped with the application, tried after the style's own font
    pub bundled: Option<PathBuf>,
    /// Platform fonts, tried in order before the built-in bitmap font
    pub system: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: u32,
    pub height: u32,
    pub thumbnail_size: u32,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("last_state.json"),
            templates_dir: PathBuf::from("templates"),
            export_dir: PathBuf::from("exports"),
        }
    }
}

impl Default for FontsConfig {
    fn default() -> Self {
        let sources = FontSources::default();
        Self {
            bundled: sources.bundled,
            system: sources.system,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            thumbnail_size: 96,
        }
    }
}

impl Config {
    /// Read settings from a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml_edit::de::from_str::<Config>(&content)?)
    }

    pub fn font_sources(&self) -> FontSources {
        FontSources {
            bundled: self.fonts.bundled.clone(),
            system: self.fonts.system.clone(),
        }
    }

    pub fn compositor(&self) -> Compositor {
        Compositor::new(self.font_sources())
    }
}
