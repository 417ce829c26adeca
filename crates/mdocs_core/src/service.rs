//! Document service: cache lifecycle and disk-then-cache mutations.
//!
//! Every mutation holds the write lock across both phases. The filesystem
//! side effect runs first; the in-memory update only runs after it
//! succeeded, so the cache never reflects an operation that did not happen
//! on disk.

use crate::error::AppError;
use crate::extract;
use crate::fs_ops;
use crate::models::doc::{Article, Doc, NormalizedDocMap};
use crate::path_codec;
use crate::settings::{Settings, SettingsPatch, SettingsService};
use crate::tree::{build_docs, DocCache, DocNode};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lifecycle state of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Never built.
    Uninitialized,
    /// Built from the current doc root; mutations are accepted.
    Ready,
    /// The last build failed or no doc root is configured.
    Empty,
}

#[derive(Debug)]
struct CacheState {
    root: PathBuf,
    root_override: Option<PathBuf>,
    /// Ignore list of the last build; folder names in it are never cached.
    ignore_dirs: Vec<String>,
    status: CacheStatus,
    cache: DocCache,
}

/// Owns the cached tree for one doc root.
#[derive(Debug)]
pub struct DocService {
    settings: Arc<SettingsService>,
    state: RwLock<CacheState>,
}

fn kind(is_file: bool) -> &'static str {
    if is_file {
        "file"
    } else {
        "folder"
    }
}

/// Reject paths whose folder segments name an ignored directory.
///
/// For a file only the ancestors are folders; a folder path is checked in
/// full.
fn check_not_ignored(
    ignore_dirs: &[String],
    segments: &[String],
    is_file: bool,
) -> Result<(), AppError> {
    let folders = if is_file {
        &segments[..segments.len().saturating_sub(1)]
    } else {
        segments
    };
    match folders
        .iter()
        .find(|segment| ignore_dirs.iter().any(|ignored| ignored == *segment))
    {
        Some(segment) => Err(AppError::BadRequest(format!(
            "'{}' is an ignored directory name",
            segment
        ))),
        None => Ok(()),
    }
}

fn check_kind(node: &DocNode, key: &str, is_file: bool) -> Result<(), AppError> {
    if node.is_file() == is_file {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "'{}' is a {}, not a {}",
        key,
        kind(node.is_file()),
        kind(is_file)
    )))
}

impl DocService {
    /// Create an uninitialized service. Call [`DocService::start`] to build.
    pub fn new(settings: Arc<SettingsService>) -> Self {
        Self {
            settings,
            state: RwLock::new(CacheState {
                root: PathBuf::new(),
                root_override: None,
                ignore_dirs: Vec::new(),
                status: CacheStatus::Uninitialized,
                cache: DocCache::empty(),
            }),
        }
    }

    /// Use `root` instead of the persisted doc root until a settings update
    /// sets a new one.
    pub fn with_doc_root_override(mut self, root: PathBuf) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.root_override = Some(root);
        }
        self
    }

    pub fn settings(&self) -> &Arc<SettingsService> {
        &self.settings
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, CacheState>, AppError> {
        self.state.read().map_err(|_| AppError::LockPoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, CacheState>, AppError> {
        self.state.write().map_err(|_| AppError::LockPoisoned)
    }

    fn write_ready(&self) -> Result<RwLockWriteGuard<'_, CacheState>, AppError> {
        let state = self.write_state()?;
        if state.status != CacheStatus::Ready {
            return Err(AppError::Unavailable(format!(
                "Doc cache is {:?}",
                state.status
            )));
        }
        Ok(state)
    }

    /// Initial build.
    pub fn start(&self) -> Result<CacheStatus, AppError> {
        tracing::info!("Building doc cache");
        self.refresh()
    }

    /// Discard the cache and rebuild it from disk with the current settings.
    ///
    /// A build failure leaves the cache empty instead of failing the caller.
    ///
    /// # Returns
    /// The resulting [`CacheStatus`].
    ///
    /// # Errors
    /// Only lock poisoning is reported.
    pub fn refresh(&self) -> Result<CacheStatus, AppError> {
        let settings = self.settings.get()?;
        let mut state = self.write_state()?;
        state.cache = DocCache::empty();
        state.status = CacheStatus::Empty;
        state.root = state
            .root_override
            .clone()
            .unwrap_or(settings.doc_root_path);

        if state.root.as_os_str().is_empty() {
            tracing::warn!("No doc root configured; doc cache is empty");
            return Ok(state.status);
        }

        state.ignore_dirs = settings.ignore_dirs;
        match build_docs(&state.root, &state.ignore_dirs) {
            Ok(docs) => {
                state.cache = DocCache::from_docs(&docs);
                state.status = CacheStatus::Ready;
                tracing::info!(
                    "Doc cache ready: {} nodes under {}",
                    state.cache.len(),
                    state.root.display()
                );
            }
            Err(err) => {
                tracing::error!(
                    "Failed to build doc cache from {}: {}",
                    state.root.display(),
                    err
                );
            }
        }
        Ok(state.status)
    }

    /// Apply a settings patch, then rebuild the cache.
    ///
    /// A patch that names a doc root clears any override.
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, AppError> {
        let clears_override = patch.doc_root_path.is_some();
        let settings = self.settings.update(patch)?;
        if clears_override {
            self.write_state()?.root_override = None;
        }
        self.refresh()?;
        Ok(settings)
    }

    pub fn status(&self) -> Result<CacheStatus, AppError> {
        Ok(self.read_state()?.status)
    }

    /// Doc root the cache was last built from.
    pub fn doc_root(&self) -> Result<PathBuf, AppError> {
        Ok(self.read_state()?.root.clone())
    }

    /// Whole tree, top level first.
    pub fn docs(&self) -> Result<Vec<Doc>, AppError> {
        Ok(self.read_state()?.cache.docs())
    }

    pub fn normalized_docs(&self) -> Result<NormalizedDocMap, AppError> {
        Ok(self.read_state()?.cache.normalized())
    }

    /// Direct children of a folder, or the top level for `None`/`""`.
    pub fn sub_docs(&self, folder_key: Option<&str>) -> Result<Vec<Doc>, AppError> {
        let key = match folder_key.filter(|key| !key.is_empty()) {
            Some(token) => path_codec::canonicalize(token)?,
            None => String::new(),
        };
        self.read_state()?.cache.shallow_children(&key)
    }

    /// Read one file with its cached metadata.
    ///
    /// # Returns
    /// `None` when the path is not a cached document or the file is gone
    /// from disk.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for invalid paths or folders.
    pub fn article(&self, file_key: &str) -> Result<Option<Article>, AppError> {
        let segments = path_codec::decode_doc_path(file_key)?;
        let key = path_codec::encode(&segments);
        let state = self.read_state()?;
        let Some(node) = state.cache.get(&key) else {
            return Ok(None);
        };
        check_kind(node, &key, true)?;

        let disk_path = fs_ops::resolve_doc_path(&state.root, &segments, true);
        let bytes = match fs::read(&disk_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("{} is cached but missing on disk", disk_path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Some(Article {
            content: String::from_utf8_lossy(&bytes).into_owned(),
            file_path: key,
            headings: node.headings.clone(),
            keywords: node.keywords.clone(),
        }))
    }

    /// Create a file or folder.
    ///
    /// Missing intermediate folders are created on disk and inserted into
    /// the cache. Existing files are never truncated.
    ///
    /// # Returns
    /// The new node.
    ///
    /// # Errors
    /// - [`AppError::AlreadyExists`] if the path is cached or the file exists.
    /// - [`AppError::BadRequest`] for invalid paths or a file ancestor.
    pub fn create(&self, path_key: &str, is_file: bool) -> Result<Doc, AppError> {
        let segments = path_codec::decode_doc_path(path_key)?;
        let key = path_codec::encode(&segments);
        let mut state = self.write_ready()?;
        check_not_ignored(&state.ignore_dirs, &segments, is_file)?;

        if state.cache.index().contains(&key) {
            return Err(AppError::AlreadyExists(key));
        }
        for depth in 1..segments.len() {
            let ancestor = path_codec::encode(&segments[..depth]);
            if state.cache.get(&ancestor).is_some_and(DocNode::is_file) {
                return Err(AppError::BadRequest(format!("'{}' is a file", ancestor)));
            }
        }

        let target = fs_ops::resolve_doc_path(&state.root, &segments, is_file);
        if is_file {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs_ops::create_new_file(&target, b"")?;
        } else {
            fs::create_dir_all(&target)?;
        }

        let parent_path = &segments[..segments.len() - 1];
        state.cache.ensure_directories(parent_path)?;
        state.cache.insert_doc(Doc::new(segments, is_file))?;
        tracing::info!("Created {} {}", kind(is_file), key);
        state
            .cache
            .doc(&key)
            .ok_or_else(|| AppError::inconsistency(format!("'{}' missing after create", key)))
    }

    /// Overwrite a file and refresh its headings and keywords.
    pub fn update_content(&self, path_key: &str, content: &str) -> Result<(), AppError> {
        let segments = path_codec::decode_doc_path(path_key)?;
        let key = path_codec::encode(&segments);
        let mut state = self.write_ready()?;

        let node = state.cache.get(&key).ok_or(AppError::NotFound)?;
        check_kind(node, &key, true)?;

        fs::write(fs_ops::resolve_doc_path(&state.root, &segments, true), content)?;

        state.cache.update_metadata(&key, extract::extract(content))?;
        tracing::info!("Updated {}", key);
        Ok(())
    }

    /// Rename a file or folder within its parent.
    ///
    /// Renaming to the current name is a no-op.
    ///
    /// # Returns
    /// The new path key.
    ///
    /// # Errors
    /// - [`AppError::NotFound`] if the source is not cached.
    /// - [`AppError::AlreadyExists`] if a sibling already uses `new_name`.
    /// - [`AppError::BadRequest`] for invalid names or a kind mismatch.
    pub fn rename(&self, path_key: &str, new_name: &str, is_file: bool) -> Result<String, AppError> {
        let segments = path_codec::decode_doc_path(path_key)?;
        path_codec::validate_segment(new_name)?;
        let key = path_codec::encode(&segments);
        let mut state = self.write_ready()?;

        let node = state.cache.get(&key).ok_or(AppError::NotFound)?;
        check_kind(node, &key, is_file)?;
        if node.name == new_name {
            return Ok(key);
        }

        let mut new_segments = segments.clone();
        if let Some(last) = new_segments.last_mut() {
            *last = new_name.to_string();
        }
        check_not_ignored(&state.ignore_dirs, &new_segments, is_file)?;
        let new_key = path_codec::encode(&new_segments);
        if state.cache.index().contains(&new_key) {
            return Err(AppError::AlreadyExists(new_key));
        }
        let from = fs_ops::resolve_doc_path(&state.root, &segments, is_file);
        let to = fs_ops::resolve_doc_path(&state.root, &new_segments, is_file);
        let case_only = node.name.to_lowercase() == new_name.to_lowercase();
        if to.exists() && !case_only {
            return Err(AppError::AlreadyExists(new_key));
        }

        fs::rename(&from, &to)?;

        let renamed = state.cache.rename(&key, new_name)?;
        tracing::info!("Renamed {} to {}", key, renamed);
        Ok(renamed)
    }

    /// Copy or move a file or folder to `dest_key`.
    ///
    /// The destination's parent must be the root or a cached folder. The
    /// destination's last segment becomes the new name.
    ///
    /// # Returns
    /// The node at the destination.
    ///
    /// # Errors
    /// - [`AppError::NotFound`] if the source is not cached.
    /// - [`AppError::AlreadyExists`] if the destination is taken.
    /// - [`AppError::BadRequest`] for a missing paste parent, a kind
    ///   mismatch, or a destination inside the source.
    pub fn move_or_copy(
        &self,
        source_key: &str,
        dest_key: &str,
        is_copy: bool,
        is_file: bool,
    ) -> Result<Doc, AppError> {
        let source = path_codec::decode_doc_path(source_key)?;
        let dest = path_codec::decode_doc_path(dest_key)?;
        let source_key = path_codec::encode(&source);
        let dest_key = path_codec::encode(&dest);
        let mut state = self.write_ready()?;

        let node = state.cache.get(&source_key).ok_or(AppError::NotFound)?;
        check_kind(node, &source_key, is_file)?;
        if dest.starts_with(&source) {
            return Err(AppError::BadRequest(format!(
                "Cannot paste '{}' into itself",
                source_key
            )));
        }
        check_not_ignored(&state.ignore_dirs, &dest, is_file)?;
        let paste_parent = path_codec::parent_key(&dest);
        if !paste_parent.is_empty()
            && !state
                .cache
                .get(&paste_parent)
                .is_some_and(|parent| !parent.is_file())
        {
            return Err(AppError::BadRequest(format!(
                "Paste target '{}' is not a folder",
                paste_parent
            )));
        }
        if state.cache.index().contains(&dest_key) {
            return Err(AppError::AlreadyExists(dest_key));
        }
        let from = fs_ops::resolve_doc_path(&state.root, &source, is_file);
        let to = fs_ops::resolve_doc_path(&state.root, &dest, is_file);
        if to.exists() {
            return Err(AppError::AlreadyExists(dest_key));
        }

        if is_copy {
            fs_ops::copy_path(&from, &to, is_file)?;
        } else {
            fs::rename(&from, &to)?;
        }

        state.cache.move_or_copy(&source_key, &dest, is_copy)?;
        tracing::info!(
            "{} {} to {}",
            if is_copy { "Copied" } else { "Moved" },
            source_key,
            dest_key
        );
        state
            .cache
            .doc(&dest_key)
            .ok_or_else(|| AppError::inconsistency(format!("'{}' missing after paste", dest_key)))
    }

    /// Delete a file, or a folder with everything below it.
    pub fn delete(&self, path_key: &str, is_file: bool) -> Result<(), AppError> {
        let segments = path_codec::decode_doc_path(path_key)?;
        let key = path_codec::encode(&segments);
        let mut state = self.write_ready()?;

        let node = state.cache.get(&key).ok_or(AppError::NotFound)?;
        check_kind(node, &key, is_file)?;

        fs_ops::remove_path(
            &fs_ops::resolve_doc_path(&state.root, &segments, is_file),
            is_file,
        )?;

        let removed = state.cache.remove(&key)?;
        tracing::info!("Deleted {} ({} nodes)", key, removed);
        Ok(())
    }

    /// Check the structural invariants of the cache.
    pub fn validate(&self) -> Result<(), AppError> {
        self.read_state()?.cache.validate()
    }
}
