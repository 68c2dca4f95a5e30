//! File-based locking so concurrent processes don't clobber shared state files

use fd_lock::RwLock;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive advisory lock on a sidecar `<file>.lock`
///
/// The lock file itself is left in place after use; deleting it would let
/// a waiting process lock an unlinked inode.
pub struct StateLock {
    lock: RwLock<File>,
    lock_path: PathBuf,
}

impl StateLock {
    /// Open (creating if needed) the lock file guarding `target`
    pub fn open(target: &Path) -> io::Result<Self> {
        let lock_path = Self::lock_path(target);

        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        Ok(Self {
            lock: RwLock::new(file),
            lock_path,
        })
    }

    /// Run `f` while holding the exclusive lock, blocking until it is free
    pub fn run<T>(&mut self, f: impl FnOnce() -> T) -> io::Result<T> {
        debug!("Waiting for lock: {:?}", self.lock_path);
        let _guard = self.lock.write()?;
        debug!("Acquired lock: {:?}", self.lock_path);
        Ok(f())
    }

    /// Get the lock file path for a state file
    fn lock_path(target: &Path) -> PathBuf {
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        target.with_file_name(name)
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}
