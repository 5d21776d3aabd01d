//! Single-instance enforcement via a PID file
//!
//! On unix the running instance holds an exclusive `flock` on the PID file
//! for its whole lifetime. The kernel drops the lock when the process dies,
//! so a leftover file from a crashed instance is simply reclaimed. The PID
//! written inside is only used for diagnostics.

use crate::error::{AppError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Attempts before giving up when the file keeps being replaced under us
#[cfg(unix)]
const MAX_LOCK_ATTEMPTS: usize = 5;

/// Held for the lifetime of the process; removes the PID file on drop
pub struct PidFile {
    path: PathBuf,
    pid: u32,
    #[cfg(unix)]
    _lock: nix::fcntl::Flock<File>,
}

impl PidFile {
    /// Claim the PID file, failing with `AlreadyRunning` if another live
    /// instance holds it
    #[cfg(unix)]
    pub fn acquire(path: &Path) -> Result<Self> {
        use nix::errno::Errno;
        use nix::fcntl::{Flock, FlockArg};

        let pid = std::process::id();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        for _ in 0..MAX_LOCK_ATTEMPTS {
            // No truncation before the lock is ours
            let file = fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)?;

            let mut lock = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(lock) => lock,
                Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                    return Err(AppError::AlreadyRunning(read_pid(path).unwrap_or(0)));
                }
                Err((_, errno)) => return Err(AppError::Io(errno.into())),
            };

            // The previous holder may have unlinked the file between our
            // open and our lock; that inode is no longer the PID file
            if !is_same_file(&lock, path)? {
                tracing::debug!("PID file {:?} was replaced while locking, retrying", path);
                continue;
            }

            if let Some(old) = read_pid(path).filter(|old| *old != pid) {
                tracing::warn!("Reclaiming stale PID file (process {} no longer holds it)", old);
            }

            lock.set_len(0)?;
            write!(lock, "{}", pid)?;
            lock.sync_all()?;
            tracing::info!("Acquired PID file {:?} (PID {})", path, pid);

            return Ok(Self {
                path: path.to_path_buf(),
                pid,
                _lock: lock,
            });
        }

        Err(AppError::Generic(format!(
            "PID file {:?} kept changing while trying to lock it",
            path
        )))
    }

    /// Claim the PID file. Without advisory locks an existing file always
    /// counts as held; remove it by hand if it is stale.
    #[cfg(not(unix))]
    pub fn acquire(path: &Path) -> Result<Self> {
        use std::io::ErrorKind;

        let pid = std::process::id();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Publish the complete file in one step so nobody sees it empty
        let staging = path.with_extension(format!("{}.tmp", pid));
        {
            let mut file = File::create(&staging)?;
            write!(file, "{}", pid)?;
            file.sync_all()?;
        }

        let linked = fs::hard_link(&staging, path);
        let _ = fs::remove_file(&staging);
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::AlreadyRunning(read_pid(path).unwrap_or(0)));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!("Acquired PID file {:?} (PID {})", path, pid);

        Ok(Self {
            path: path.to_path_buf(),
            pid,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for PidFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PidFile")
            .field("path", &self.path)
            .field("pid", &self.pid)
            .finish()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        // Runs before the lock field is released, so nobody else can have
        // claimed the file yet
        if read_pid(&self.path) == Some(self.pid) {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove PID file {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(unix)]
fn is_same_file(file: &File, path: &Path) -> Result<bool> {
    use std::io::ErrorKind;
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|pid| *pid != 0)
}
