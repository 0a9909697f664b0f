//! Cooperative lock files guarding score store read-modify-write cycles.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use fs_err::{File, OpenOptions};

use crate::constants::LOCK_FILE_SUFFIX;
use crate::error::{AnnotateError, Result};
use crate::types::LockSettings;

/// Exclusive advisory lock held on a `<store>.lock` file next to the store.
///
/// The OS lock is released when the guard drops, so every exit path of the
/// guarded section (including `?` and panics) gives the store back.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Path of the lock file guarding `store_path`.
    #[must_use]
    pub fn lock_path_for(store_path: &Path) -> PathBuf {
        let mut name = OsString::from(store_path.as_os_str());
        name.push(LOCK_FILE_SUFFIX);
        PathBuf::from(name)
    }

    /// Block until the lock guarding `store_path` is ours or the timeout elapses.
    pub fn acquire(store_path: &Path, settings: &LockSettings) -> Result<Self> {
        let path = Self::lock_path_for(store_path);
        let file = open_lock_file(&path)?;

        let deadline = Instant::now() + Duration::from_millis(settings.timeout_ms);
        let poll = Duration::from_millis(settings.poll_ms.max(1));
        let mut contended = false;
        loop {
            match FileExt::try_lock_exclusive(file.file()) {
                Ok(()) => {
                    if contended {
                        tracing::debug!(lock.path = %path.display(), "lock acquired after contention");
                    }
                    return Ok(Self { file, path });
                }
                Err(err) if is_contended(&err) => {
                    if Instant::now() >= deadline {
                        tracing::warn!(
                            lock.path = %path.display(),
                            lock.timeout_ms = settings.timeout_ms,
                            "timed out waiting for store lock"
                        );
                        return Err(AnnotateError::Lock(format!(
                            "timed out after {}ms waiting for {}",
                            settings.timeout_ms,
                            path.display()
                        )));
                    }
                    contended = true;
                    thread::sleep(poll);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Take the lock only if nobody else holds it.
    pub fn try_acquire(store_path: &Path) -> Result<Option<Self>> {
        let path = Self::lock_path_for(store_path);
        let file = open_lock_file(&path)?;
        match FileExt::try_lock_exclusive(file.file()) {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(err) if is_contended(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(self.file.file()) {
            tracing::warn!(lock.path = %self.path.display(), "failed to release lock: {err}");
        }
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
