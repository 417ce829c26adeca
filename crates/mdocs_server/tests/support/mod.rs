//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use mdocs_core::{Settings, SettingsService};
use mdocs_server::{create_app, AppState, Config, DocService};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) fn test_config(settings_path: &Path) -> Config {
    Config {
        port: 0,
        settings_path: settings_path.to_path_buf(),
        doc_root: None,
        max_body_size: 10_000_000,
    }
}

/// Write `(relative path, content)` pairs under `root`; a trailing `/`
/// creates an empty folder.
pub(crate) fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if rel.ends_with('/') {
            fs::create_dir_all(&path).expect("mkdir");
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, content).expect("write");
    }
}

/// Start a test server over a temp workspace.
///
/// The temp dir holds `docs/` (the doc root, seeded with `files`) and the
/// settings file.
pub(crate) fn setup_test_server(files: &[(&str, &str)]) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let doc_root = temp_dir.path().join("docs");
    fs::create_dir_all(&doc_root).expect("doc root");
    write_files(&doc_root, files);

    let settings_path = temp_dir.path().join("settings.json");
    let settings = SettingsService::load(&settings_path).expect("settings");
    settings
        .update(mdocs_core::SettingsPatch {
            doc_root_path: Some(doc_root),
            ignore_dirs: Some(Settings::default().ignore_dirs),
        })
        .expect("point settings at doc root");

    let docs = DocService::new(Arc::new(settings));
    docs.start().expect("start");
    let state = AppState::new(test_config(&settings_path), docs);
    let server = TestServer::new(create_app(state, false)).expect("server");
    (server, temp_dir)
}

/// Percent-encoded key for a `/`-joined path literal.
pub(crate) fn key(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    mdocs_core::path_codec::encode(&segments)
}
