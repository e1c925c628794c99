use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::template::{self, TemplateError};
use crate::watermark::WatermarkConfig;

/// The live configuration edited by the user, persisted after every change.
///
/// Renderers never borrow the live value; they take a [`snapshot`](Session::snapshot).
#[derive(Debug)]
pub struct Session {
    config: WatermarkConfig,
    state_path: PathBuf,
}

impl Session {
    /// Restore the last session from `state_path`, or start from defaults.
    pub fn load(state_path: impl Into<PathBuf>) -> Self {
        let state_path = state_path.into();
        let config = template::load_state(&state_path).unwrap_or_else(|| {
            debug!("No prior session state at {:?}, using defaults", state_path);
            WatermarkConfig::default()
        });
        Self { config, state_path }
    }

    /// Owned copy of the current configuration.
    pub fn snapshot(&self) -> WatermarkConfig {
        self.config.clone()
    }

    /// Apply one edit and persist the result.
    pub fn update<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut WatermarkConfig),
    {
        edit(&mut self.config);
        self.persist();
    }

    /// Drag the watermark by a pointer delta. Returns false when dragging is disabled.
    pub fn drag(&mut self, dx: i32, dy: i32) -> bool {
        let moved = self.config.layout.drag_by(dx, dy);
        if moved {
            self.persist();
        }
        moved
    }

    /// Replace the live configuration with a template's contents.
    pub fn load_template(&mut self, path: &Path) -> Result<(), TemplateError> {
        self.config = template::load_template(path)?;
        self.persist();
        Ok(())
    }

    pub fn save_template(&self, path: &Path) -> Result<(), TemplateError> {
        template::save_template(path, &self.config)
    }

    /// Session state writes never fail the caller.
    fn persist(&self) {
        if let Err(e) = template::save_template(&self.state_path, &self.config) {
            warn!("Failed to save session state to {:?}: {}", self.state_path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::Anchor;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_session_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let session = Session::load(temp_dir.path().join("last_state.json"));
        assert_eq!(session.snapshot(), WatermarkConfig::default());
    }

    #[test]
    fn test_edits_persist_across_loads() {
        let temp_dir = TempDir::new().unwrap();
        let state = temp_dir.path().join("last_state.json");

        let mut session = Session::load(&state);
        session.update(|config| {
            config.text.text = "Edited".to_string();
            config.layout.anchor = Anchor::TopRight;
        });
        assert!(state.exists());

        let restored = Session::load(&state);
        assert_eq!(restored.snapshot().text.text, "Edited");
        assert_eq!(restored.snapshot().layout.anchor, Anchor::TopRight);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_edits() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::load(temp_dir.path().join("state.json"));

        let before = session.snapshot();
        session.update(|config| config.text.opacity = 90);
        assert_eq!(before.text.opacity, 40);
        assert_eq!(session.snapshot().text.opacity, 90);
    }

    #[test]
    fn test_drag_moves_offsets_only_when_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::load(temp_dir.path().join("state.json"));

        assert!(session.drag(12, -4));
        assert_eq!(session.snapshot().layout.offset_x, 12);
        assert_eq!(session.snapshot().layout.offset_y, -4);

        session.update(|config| config.layout.allow_drag = false);
        assert!(!session.drag(100, 100));
        assert_eq!(session.snapshot().layout.offset_x, 12);
    }

    #[test]
    fn test_loading_template_replaces_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let state = temp_dir.path().join("state.json");
        let template_path = temp_dir.path().join("tpl.json");

        let mut source = Session::load(temp_dir.path().join("other.json"));
        source.update(|config| config.export.text = "_tpl".to_string());
        source.save_template(&template_path).unwrap();

        let mut session = Session::load(&state);
        session.load_template(&template_path).unwrap();
        assert_eq!(session.snapshot().export.text, "_tpl");
        assert_eq!(Session::load(&state).snapshot().export.text, "_tpl");
    }

    #[test]
    fn test_corrupt_state_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let state = temp_dir.path().join("state.json");
        std::fs::write(&state, "garbage").unwrap();
        assert_eq!(Session::load(&state).snapshot(), WatermarkConfig::default());
    }
}
