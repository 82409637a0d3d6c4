//! Per-run temporary directories for credentials and generated config.
//!
//! A [`ScopedDir`] is removed when dropped, on success, on error and during
//! unwinding. Live directories are also tracked in a process-wide registry so
//! an interrupt handler can remove them before the process exits.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use tempfile::TempDir;

use crate::release::error::{ErrorExt, Result};

static LIVE_DIRS: LazyLock<Mutex<Vec<PathBuf>>> = LazyLock::new(|| Mutex::new(Vec::new()));

/// Uniquely named directory that disappears with its owner.
#[derive(Debug)]
pub struct ScopedDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScopedDir {
    /// Creates `<parent>/<prefix><random>`, creating `parent` if needed.
    pub fn new_in(parent: &Path, prefix: &str) -> Result<Self> {
        fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .fs_context("creating temporary directory in", parent)?;
        let path = dir.path().to_path_buf();
        register(&path);
        log::debug!("Created scoped directory {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `contents` to `name` inside the directory, owner-readable only.
    pub fn write_secret(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let target = self.path.join(name);
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&target).fs_context("creating credential file", &target)?;
        file.write_all(contents.as_bytes())
            .fs_context("writing credential file", &target)?;
        Ok(target)
    }

    /// Removes the directory now, reporting failure instead of logging it.
    pub fn close(mut self) -> Result<()> {
        unregister(&self.path);
        match self.dir.take() {
            Some(dir) => dir.close().fs_context("removing directory", &self.path),
            None => Ok(()),
        }
    }
}

impl Drop for ScopedDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            unregister(&self.path);
            if let Err(e) = dir.close() {
                log::warn!(
                    "Failed to remove temporary directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

fn register(path: &Path) {
    if let Ok(mut live) = LIVE_DIRS.lock() {
        live.push(path.to_path_buf());
    }
}

fn unregister(path: &Path) {
    if let Ok(mut live) = LIVE_DIRS.lock() {
        live.retain(|p| p != path);
    }
}

/// Directories currently owned by a [`ScopedDir`].
pub fn live_scoped_dirs() -> Vec<PathBuf> {
    LIVE_DIRS.lock().map(|live| live.clone()).unwrap_or_default()
}

/// Removes every live scoped directory. Called from the interrupt handler,
/// where destructors will not run.
pub fn purge_scoped_dirs() -> usize {
    let paths = match LIVE_DIRS.lock() {
        Ok(mut live) => std::mem::take(&mut *live),
        Err(_) => return 0,
    };
    let mut removed = 0;
    for path in paths {
        match fs::remove_dir_all(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => eprintln!("failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}
