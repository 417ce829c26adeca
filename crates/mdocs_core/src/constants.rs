//! Shared constants used across mdocs crates.

/// Default API port for the docs server.
pub const DEFAULT_PORT: u16 = 3024;

/// Default maximum request body size accepted by the API layer.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// File extension (without the dot) of documents mirrored into the tree.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Deepest heading level collected by the extractor by default.
pub const DEFAULT_HEADING_DEPTH: usize = 4;

/// Directory names skipped by the tree builder when no settings exist yet.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &["imgs", "node_modules", "dist"];

/// Settings file name inside the default settings directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";
