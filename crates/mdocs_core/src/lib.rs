//! Core domain library for mdocs (doc tree cache, settings, config).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Scoped environment overrides for tests.
pub mod env;
/// Application error types.
pub mod error;
/// Heading and keyword extraction from markdown content.
pub mod extract;
/// Filesystem helpers used by the mutation engine.
pub mod fs_ops;
/// Wire models for documents, articles, and requests.
pub mod models;
/// Conversion between path segments and encoded path keys.
pub mod path_codec;
/// Document service: lifecycle and disk-then-cache mutations.
pub mod service;
/// Persisted doc-root settings.
pub mod settings;
/// Arena tree, normalized index, and cache mutations.
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::DEFAULT_PORT;
pub use error::AppError;
pub use service::{CacheStatus, DocService};
pub use settings::{Settings, SettingsPatch, SettingsService};
