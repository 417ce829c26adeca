//! Shared test-only helpers for mdocs_core.

use crate::settings::{Settings, SettingsService};
use crate::tree::build_docs;
use crate::{CacheStatus, DocService};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Split a `/`-joined literal into owned segments.
pub(crate) fn segs(path: &str) -> Vec<String> {
    path.split('/').map(str::to_string).collect()
}

/// Write `(relative path, content)` pairs under a fresh temp dir.
///
/// Paths ending in `/` create empty directories.
///
/// # Panics
/// Panics if the temp dir or any file cannot be created.
pub(crate) fn write_doc_root(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (rel, content) in files {
        let path = dir.path().join(rel);
        if rel.ends_with('/') {
            fs::create_dir_all(&path).expect("mkdir");
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, content).expect("write");
    }
    dir
}

/// Build a started service over a temp doc root holding `files`.
///
/// Keep the [`TempDir`] alive for the full test.
///
/// # Panics
/// Panics if the initial build does not reach [`CacheStatus::Ready`].
pub(crate) fn setup_service(files: &[(&str, &str)]) -> (DocService, TempDir) {
    let dir = write_doc_root(files);
    let settings = SettingsService::in_memory(Settings {
        doc_root_path: dir.path().to_path_buf(),
        ..Settings::default()
    });
    let service = DocService::new(Arc::new(settings));
    assert_eq!(service.start().expect("start"), CacheStatus::Ready);
    (service, dir)
}

/// Asserts the cache is internally consistent and matches a fresh scan of
/// `root`.
///
/// # Panics
/// Panics on any invariant violation or when the cached tree differs from
/// what a rebuild would produce.
pub(crate) fn assert_cache_consistent(service: &DocService, root: &Path) {
    if let Err(err) = service.validate() {
        panic!("cache invariants violated: {}", err);
    }
    let ignore_dirs = service.settings().get().expect("settings").ignore_dirs;
    let rebuilt = build_docs(root, &ignore_dirs).expect("rebuild");
    assert_eq!(
        service.docs().expect("docs"),
        rebuilt,
        "cached tree drifted from disk"
    );
    assert_eq!(
        service.normalized_docs().expect("normalized").len(),
        rebuilt.iter().map(|doc| doc.subtree_len()).sum::<usize>(),
        "index size does not match tree size"
    );
}
