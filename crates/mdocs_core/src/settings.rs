//! Persisted doc-root settings.

use crate::config::resolve_user_path;
use crate::constants::DEFAULT_IGNORE_DIRS;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Which directory is mirrored and what to skip inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Absolute doc root. Empty means not configured yet.
    pub doc_root_path: PathBuf,
    /// Directory names skipped at any depth.
    pub ignore_dirs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            doc_root_path: PathBuf::new(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Partial settings update. Missing fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub doc_root_path: Option<PathBuf>,
    pub ignore_dirs: Option<Vec<String>>,
}

/// Holds the current [`Settings`] and writes them back on every update.
#[derive(Debug)]
pub struct SettingsService {
    settings: RwLock<Settings>,
    path: Option<PathBuf>,
}

impl SettingsService {
    /// Load settings from `path`, writing defaults if the file is missing.
    ///
    /// An unreadable or malformed file is logged and replaced by defaults in
    /// memory; the file itself is left alone.
    ///
    /// # Errors
    /// Returns an error only when defaults cannot be written for a missing
    /// file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let settings = if path.exists() {
            match read_settings(&path) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::warn!(
                        "Failed to read settings {}: {}; using defaults",
                        path.display(),
                        err
                    );
                    Settings::default()
                }
            }
        } else {
            let settings = Settings::default();
            write_settings(&path, &settings)?;
            tracing::info!("Wrote default settings to {}", path.display());
            settings
        };

        Ok(Self {
            settings: RwLock::new(settings),
            path: Some(path),
        })
    }

    /// Settings that are never persisted.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            path: None,
        }
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Snapshot of the current settings.
    pub fn get(&self) -> Result<Settings, AppError> {
        self.settings
            .read()
            .map(|settings| settings.clone())
            .map_err(|_| AppError::LockPoisoned)
    }

    /// Apply `patch`, persist, and return the new settings.
    ///
    /// A new doc root is resolved against the home directory and must be an
    /// existing directory.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for a missing doc root, or an I/O or
    /// serialization error when persisting fails. Nothing changes on error.
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings, AppError> {
        let doc_root = match patch.doc_root_path {
            Some(raw) => {
                let resolved = resolve_user_path(&raw);
                if !resolved.is_dir() {
                    tracing::error!("Doc root does not exist: {}", resolved.display());
                    return Err(AppError::BadRequest(format!(
                        "Workspace does not exist: {}",
                        resolved.display()
                    )));
                }
                Some(resolved)
            }
            None => None,
        };

        let mut guard = self.settings.write().map_err(|_| AppError::LockPoisoned)?;
        let mut next = guard.clone();
        if let Some(doc_root) = doc_root {
            next.doc_root_path = doc_root;
        }
        if let Some(ignore_dirs) = patch.ignore_dirs {
            next.ignore_dirs = ignore_dirs;
        }
        if let Some(path) = &self.path {
            write_settings(path, &next)?;
        }
        *guard = next.clone();
        tracing::info!("Settings updated: {:?}", next);
        Ok(next)
    }
}

fn read_settings(path: &Path) -> Result<Settings, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_writes_defaults_for_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let service = SettingsService::load(&path).expect("load");

        assert_eq!(service.get().expect("get"), Settings::default());
        let written: Settings =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(written.ignore_dirs, vec!["imgs", "node_modules", "dist"]);
    }

    #[test]
    fn load_falls_back_to_defaults_on_malformed_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").expect("write");

        let service = SettingsService::load(&path).expect("load");
        assert_eq!(service.get().expect("get"), Settings::default());
        assert_eq!(fs::read_to_string(&path).expect("read"), "{not json");
    }

    #[test]
    fn update_persists_camel_case_json() {
        let dir = TempDir::new().expect("tempdir");
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).expect("mkdir");
        let path = dir.path().join("settings.json");
        let service = SettingsService::load(&path).expect("load");

        let updated = service
            .update(SettingsPatch {
                doc_root_path: Some(docs.clone()),
                ignore_dirs: Some(vec!["drafts".to_string()]),
            })
            .expect("update");
        assert_eq!(updated.doc_root_path, docs);

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"docRootPath\""));
        assert!(raw.contains("\"ignoreDirs\""));
        let reloaded = SettingsService::load(&path).expect("reload");
        assert_eq!(reloaded.get().expect("get"), updated);
    }

    #[test]
    fn update_rejects_missing_doc_root_and_keeps_state() {
        let dir = TempDir::new().expect("tempdir");
        let service = SettingsService::in_memory(Settings::default());
        let err = service
            .update(SettingsPatch {
                doc_root_path: Some(dir.path().join("absent")),
                ignore_dirs: Some(vec![]),
            })
            .expect_err("missing root");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(service.get().expect("get"), Settings::default());
    }

    #[test]
    fn patch_without_doc_root_only_touches_ignore_dirs() {
        let service = SettingsService::in_memory(Settings::default());
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"ignoreDirs":["tmp"]}"#).expect("patch");
        let updated = service.update(patch).expect("update");
        assert_eq!(updated.ignore_dirs, vec!["tmp"]);
        assert_eq!(updated.doc_root_path, PathBuf::new());
    }
}
