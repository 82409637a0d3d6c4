//! File system utilities for the release pipeline.
//!
//! Provides idempotent directory operations, symlink-preserving tree copies
//! and the exclusion-aware project walk used by detection.

use crate::release::error::{ErrorExt, Result};
use std::{
    fs,
    io::{self},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Directory names never descended into while scanning a checkout.
pub const EXCLUDED_DIR_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "Pods",
    "Carthage",
    ".build",
    "DerivedData",
];

/// Bundle-like directory extensions that carry their own Info.plist.
pub const EXCLUDED_DIR_EXTENSIONS: &[&str] = &["app", "framework", "xcframework", "xcarchive"];

/// Creates all of the directories of the specified path, erasing it first if specified.
pub fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path)?;
    }
    fs::create_dir_all(path).fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists.
pub fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Makes a symbolic link.
#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link.
#[cfg(windows)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Symlinks are recreated rather than followed; framework bundles rely on
/// their `Versions/Current` links surviving the copy.
pub fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        crate::bail!("{} is not a directory", from.display());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).fs_context("creating directory", parent)?;
    }

    for entry in WalkDir::new(from) {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path()).fs_context("reading link", entry.path())?;
            symlink(&target, &dest_path).fs_context("creating link", &dest_path)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path).fs_context("copying file to", &dest_path)?;
        }
    }

    Ok(())
}

/// Finds every file under `root` whose file name satisfies `matches`.
///
/// Entries are visited in file-name order. Directories named in
/// [`EXCLUDED_DIR_NAMES`], bundle directories with an extension from
/// [`EXCLUDED_DIR_EXTENSIONS`], and any path listed in `skip` are pruned.
/// Results are ordered shallowest first, then lexically, so the first
/// element is the canonical pick when several candidates exist.
pub fn find_files<F>(root: &Path, skip: &[PathBuf], matches: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&str) -> bool,
{
    let mut found: Vec<(usize, PathBuf)> = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry, skip));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if matches(&name) {
            found.push((entry.depth(), entry.into_path()));
        }
    }

    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn is_pruned(entry: &walkdir::DirEntry, skip: &[PathBuf]) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    if skip.iter().any(|s| s == entry.path()) {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if EXCLUDED_DIR_NAMES.contains(&name.as_ref()) {
        return true;
    }
    entry
        .path()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXCLUDED_DIR_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_files_prefers_shallow_then_lexical() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b/nested/Info.plist"), "").unwrap();
        fs::write(root.join("b/Info.plist"), "").unwrap();
        fs::write(root.join("a/Info.plist"), "").unwrap();

        let found = find_files(root, &[], |name| name == "Info.plist").unwrap();
        assert_eq!(
            found,
            vec![
                root.join("a/Info.plist"),
                root.join("b/Info.plist"),
                root.join("b/nested/Info.plist"),
            ]
        );
    }

    #[test]
    fn find_files_prunes_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for sub in [".git", "node_modules/pkg", "Vendor/Sparkle.framework", "build"] {
            fs::create_dir_all(root.join(sub)).unwrap();
            fs::write(root.join(sub).join("Info.plist"), "").unwrap();
        }

        let found = find_files(root, &[root.join("build")], |name| name == "Info.plist").unwrap();
        assert!(found.is_empty(), "unexpected matches: {found:?}");
    }

    #[test]
    fn copy_dir_preserves_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Demo.framework");
        fs::create_dir_all(src.join("Versions/A")).unwrap();
        fs::write(src.join("Versions/A/Demo"), "bin").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink("A", src.join("Versions/Current")).unwrap();

        let dst = dir.path().join("copy/Demo.framework");
        copy_dir(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("Versions/A/Demo")).unwrap(), "bin");
        #[cfg(unix)]
        assert_eq!(
            fs::read_link(dst.join("Versions/Current")).unwrap(),
            PathBuf::from("A")
        );
    }

    #[test]
    fn removals_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        remove_dir_all(&dir.path().join("missing")).unwrap();
        remove_file(&dir.path().join("missing.txt")).unwrap();
    }
}
