//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT, SETTINGS_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Runtime configuration for the docs server.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Where the persisted [`crate::Settings`] live.
    pub settings_path: PathBuf,
    /// Doc root override; takes precedence over the persisted setting.
    pub doc_root: Option<PathBuf>,
    pub max_body_size: usize,
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = resolve_home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve a user-supplied doc root: `~` is expanded and relative paths are
/// taken relative to the home directory.
pub fn resolve_user_path(path: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(raw) => expand_tilde(raw),
        None => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        return expanded;
    }
    match resolve_home_dir() {
        Some(home) => home.join(expanded),
        None => expanded,
    }
}

/// Locate the current user's home directory.
pub fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    // Windows legacy HOMEDRIVE + HOMEPATH
    if let (Ok(drive), Ok(path)) = (env::var("HOMEDRIVE"), env::var("HOMEPATH")) {
        if !drive.trim().is_empty() && !path.trim().is_empty() {
            return Some(PathBuf::from(format!("{}{}", drive, path)));
        }
    }

    env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn default_settings_path() -> PathBuf {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache").join("mdocs").join(SETTINGS_FILE_NAME)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            settings_path: env::var("MDOCS_SETTINGS_PATH")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(|value| expand_tilde(&value))
                .unwrap_or_else(default_settings_path),
            doc_root: env::var("MDOCS_DOC_ROOT")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(|value| resolve_user_path(Path::new(&value))),
            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
        }
    }
}
