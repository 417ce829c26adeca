//! Wholesale scan of a doc root into an owned, sorted tree.

use super::order::{self, SortKey};
use crate::error::AppError;
use crate::extract;
use crate::fs_ops::markdown_stem;
use crate::models::doc::Doc;
use crate::path_codec;
use std::fs;
use std::path::Path;

/// Scan `root` and return its markdown files and directories as a tree.
///
/// Directories whose name is in `ignore_dirs` are skipped at any depth.
/// Every other directory is included, even if it holds no markdown. When a
/// directory and a markdown file share a name, the directory wins.
///
/// Symlinks to directories are not followed; symlinks to markdown files are
/// read like regular files. Entries whose name is not a valid path segment
/// (`..md`, for example, whose stem is `.`) are skipped with a warning.
///
/// # Arguments
/// - `root`: Absolute doc root.
/// - `ignore_dirs`: Directory names to skip.
///
/// # Returns
/// Top-level documents, sorted directories first.
///
/// # Errors
/// Returns [`AppError::Io`] when `root` or any directory below it cannot
/// be read.
pub fn build_docs(root: &Path, ignore_dirs: &[String]) -> Result<Vec<Doc>, AppError> {
    let mut docs = scan_dir(root, &[], ignore_dirs)?;
    sort_docs(&mut docs);
    Ok(docs)
}

fn scan_dir(dir: &Path, parent_path: &[String], ignore_dirs: &[String]) -> Result<Vec<Doc>, AppError> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("Skipping non UTF-8 entry {:?}", entry.path());
            continue;
        };
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if ignore_dirs.iter().any(|ignored| ignored == &name) {
                continue;
            }
            if !addressable(&entry.path(), &name) {
                continue;
            }
            let mut path = parent_path.to_vec();
            path.push(name);
            let mut doc = Doc::new(path, false);
            doc.children = scan_dir(&entry.path(), &doc.path, ignore_dirs)?;
            dirs.push(doc);
        } else if entry.path().is_file() {
            let Some(stem) = markdown_stem(&name) else {
                continue;
            };
            if !addressable(&entry.path(), stem) {
                continue;
            }
            let mut path = parent_path.to_vec();
            path.push(stem.to_string());
            let bytes = fs::read(entry.path())?;
            let metadata = extract::extract(&String::from_utf8_lossy(&bytes));
            let mut doc = Doc::new(path, true);
            doc.headings = metadata.headings;
            doc.keywords = metadata.keywords;
            files.push(doc);
        }
    }

    files.retain(|file| {
        let shadowed = dirs.iter().any(|dir| dir.name == file.name);
        if shadowed {
            tracing::warn!(
                "Skipping {}.md: a directory with the same name exists",
                file.path.join("/")
            );
        }
        !shadowed
    });

    dirs.append(&mut files);
    Ok(dirs)
}

/// Whether `segment` can be used in a path key.
fn addressable(path: &Path, segment: &str) -> bool {
    match path_codec::validate_segment(segment) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("Skipping {}: {}", path.display(), err);
            false
        }
    }
}

fn sort_docs(docs: &mut [Doc]) {
    docs.sort_by(|a, b| {
        order::compare(
            SortKey {
                is_dir: !a.is_file,
                name: &a.name,
                id: &a.id,
            },
            SortKey {
                is_dir: !b.is_file,
                name: &b.name,
                id: &b.id,
            },
        )
    });
    for doc in docs.iter_mut() {
        sort_docs(&mut doc.children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    fn ignore() -> Vec<String> {
        vec!["imgs".to_string(), "node_modules".to_string()]
    }

    #[test]
    fn builds_directory_with_file_metadata() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a/b.md", "# Title\n**Key**");

        let docs = build_docs(dir.path(), &ignore()).expect("build");
        assert_eq!(docs.len(), 1);
        let a = &docs[0];
        assert_eq!(a.name, "a");
        assert!(!a.is_file);
        assert_eq!(a.children.len(), 1);
        let b = &a.children[0];
        assert_eq!(b.name, "b");
        assert!(b.is_file);
        assert_eq!(b.path, vec!["a", "b"]);
        assert_eq!(b.headings, vec!["# Title"]);
        assert_eq!(b.keywords, vec!["Key"]);
    }

    #[test]
    fn skips_ignored_dirs_and_non_markdown() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "imgs/x.md", "");
        write(dir.path(), "docs/node_modules/y.md", "");
        write(dir.path(), "docs/notes.txt", "");
        write(dir.path(), "docs/.md", "");
        write(dir.path(), "top.md", "");

        let docs = build_docs(dir.path(), &ignore()).expect("build");
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "top"]);
        assert!(docs[0].children.is_empty());
    }

    #[test]
    fn sorts_directories_first_then_names_case_insensitively() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "b.md", "");
        write(dir.path(), "A.md", "");
        write(dir.path(), "zdir/c.md", "");
        fs::create_dir_all(dir.path().join("Ydir")).expect("mkdir");

        let docs = build_docs(dir.path(), &[]).expect("build");
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Ydir", "zdir", "A", "b"]);
    }

    #[test]
    fn directory_shadows_same_named_file() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "guide.md", "# Loose");
        write(dir.path(), "guide/intro.md", "");

        let docs = build_docs(dir.path(), &[]).expect("build");
        assert_eq!(docs.len(), 1);
        assert!(!docs[0].is_file);
        assert_eq!(docs[0].children[0].name, "intro");
    }

    #[test]
    fn skips_names_that_are_not_valid_segments() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "..md", "");
        write(dir.path(), "...md", "");
        write(dir.path(), "ok.md", "");

        let docs = build_docs(dir.path(), &[]).expect("build");
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["ok"]);
    }

    #[cfg(unix)]
    #[test]
    fn follows_file_symlinks_but_not_directory_symlinks() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().join("root");
        write(dir.path(), "outside/inner.md", "");
        write(dir.path(), "loose.md", "# Linked");
        fs::create_dir_all(&root).expect("mkdir");
        std::os::unix::fs::symlink(dir.path().join("outside"), root.join("linked"))
            .expect("dir symlink");
        std::os::unix::fs::symlink(dir.path().join("loose.md"), root.join("note.md"))
            .expect("file symlink");

        let docs = build_docs(&root, &[]).expect("build");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "note");
        assert_eq!(docs[0].headings, vec!["# Linked"]);
    }

    #[test]
    fn missing_root_is_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = build_docs(&dir.path().join("absent"), &[]).expect_err("missing");
        assert!(matches!(err, AppError::Io(_)));
    }
}
