// src/infra/prefs.rs — Local device preferences
//
// Stored in `~/.support-chat/state/prefs.json`. Missing or unreadable files
// yield defaults; nothing here is fatal.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::history::ChatMode;
use crate::infra::errors::ChatError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Last mode the visitor picked; wins over a session's stored mode on startup.
    #[serde(default)]
    pub mode: Option<ChatMode>,
    /// Print the session list after changes to it.
    #[serde(default)]
    pub sidebar_open: bool,
}

pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Preferences {
        read_json(&self.path).unwrap_or_default()
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), ChatError> {
        write_json_atomic(&self.path, prefs)
    }

    /// Apply `change` and persist, logging instead of failing.
    pub fn update(&self, change: impl FnOnce(&mut Preferences)) -> Preferences {
        let mut prefs = self.load();
        change(&mut prefs);
        if let Err(e) = self.save(&prefs) {
            tracing::warn!("Could not save preferences to {}: {e}", self.path.display());
        }
        prefs
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!("Ignoring malformed {}: {e}", path.display());
            None
        }
    }
}

/// Atomically write a JSON file (temp file + rename).
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ChatError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(value)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state.json".into());
    let tmp = dir.join(format!(".{file_name}.tmp"));

    let mut f = std::fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    f.flush()?;
    f.sync_all()?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("nested/prefs.json"));
        let prefs = Preferences {
            mode: Some(ChatMode::Gemini),
            sidebar_open: true,
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("prefs.json"));
        store.update(|p| p.mode = Some(ChatMode::Mcp));
        let updated = store.update(|p| p.sidebar_open = !p.sidebar_open);
        assert_eq!(updated.mode, Some(ChatMode::Mcp));
        assert!(store.load().sidebar_open);
    }

    #[test]
    fn test_malformed_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(PreferenceStore::new(path).load(), Preferences::default());
    }
}
