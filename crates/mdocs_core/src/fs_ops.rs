//! Filesystem helpers for the disk half of document mutations.

use crate::constants::MARKDOWN_EXTENSION;
use crate::error::AppError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Map path segments to a location under `root`.
///
/// Files get the markdown extension appended to the last segment; names
/// containing dots keep them (`v1.2` becomes `v1.2.md`).
pub fn resolve_doc_path<S: AsRef<str>>(root: &Path, segments: &[S], is_file: bool) -> PathBuf {
    let mut path = root.to_path_buf();
    if let Some((last, parents)) = segments.split_last() {
        for segment in parents {
            path.push(segment.as_ref());
        }
        if is_file {
            path.push(format!("{}.{}", last.as_ref(), MARKDOWN_EXTENSION));
        } else {
            path.push(last.as_ref());
        }
    }
    path
}

/// Return the document name of a markdown file name, or `None` for anything
/// else (including a bare `.md`).
pub fn markdown_stem(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(MARKDOWN_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Create a new file with `content`, failing if anything exists at `path`.
///
/// # Errors
/// Returns [`AppError::AlreadyExists`] when the path is taken, or
/// [`AppError::Io`] for other failures.
pub fn create_new_file(path: &Path, content: &[u8]) -> Result<(), AppError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => AppError::AlreadyExists(path.display().to_string()),
            _ => AppError::Io(err),
        })?;
    file.write_all(content)?;
    Ok(())
}

/// Recursively copy a directory tree into `dst`.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&path, &dst_path)?;
        } else {
            fs::copy(&path, &dst_path)?;
        }
    }

    Ok(())
}

/// Copy a file or directory from `src` to `dst`.
pub fn copy_path(src: &Path, dst: &Path, is_file: bool) -> Result<(), AppError> {
    if is_file {
        fs::copy(src, dst)?;
        Ok(())
    } else {
        copy_dir_recursive(src, dst)
    }
}

/// Remove a file, or a directory with everything under it.
pub fn remove_path(path: &Path, is_file: bool) -> Result<(), AppError> {
    if is_file {
        fs::remove_file(path)?;
    } else {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}
