//! Per-scope exclusive advisory lock (§5).
//!
//! Grounded on the same `fs-err` + `nix::fcntl::flock` pairing moss uses for
//! its installation lockfile, but non-blocking with a caller-configured
//! budget instead of blocking forever: a lock acquisition that cannot
//! succeed within the budget returns `ScopeBusy` and makes no side effects.

use crate::core::error::PaccError;
use fs_err::File;
use nix::fcntl::{flock, FlockArg};
use std::os::fd::AsRawFd;
use std::path::Path;
use std::time::{Duration, Instant};

/// An acquired exclusive lock on a scope's `engine/locks/scope.lock` file.
/// Released by `flock` on drop, when the underlying `File` closes.
pub struct ScopeLock {
    _file: File,
}

impl ScopeLock {
    /// Retry `LockExclusiveNonblock` until `timeout` elapses, then give up.
    /// A zero timeout still attempts the lock exactly once.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, PaccError> {
        let file = File::options().create(true).write(true).truncate(false).open(path)?;
        let deadline = Instant::now() + timeout;
        let retry_interval = Duration::from_millis(20);

        loop {
            match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
                Ok(()) => return Ok(Self { _file: file }),
                Err(nix::errno::Errno::EWOULDBLOCK) => {
                    if Instant::now() >= deadline {
                        return Err(PaccError::ScopeBusy(path.display().to_string()));
                    }
                    std::thread::sleep(retry_interval.min(deadline.saturating_duration_since(Instant::now())));
                }
                Err(errno) => return Err(std::io::Error::from(errno).into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_succeeds_on_fresh_lock_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scope.lock");
        let lock = ScopeLock::acquire(&path, Duration::from_millis(50));
        assert!(lock.is_ok());
    }

    #[test]
    fn second_acquire_times_out_while_first_is_held() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scope.lock");
        let _held = ScopeLock::acquire(&path, Duration::from_millis(50)).unwrap();
        let second = ScopeLock::acquire(&path, Duration::from_millis(80));
        assert!(matches!(second, Err(PaccError::ScopeBusy(_))));
    }

    #[test]
    fn lock_is_released_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scope.lock");
        {
            let _held = ScopeLock::acquire(&path, Duration::from_millis(50)).unwrap();
        }
        let reacquired = ScopeLock::acquire(&path, Duration::from_millis(50));
        assert!(reacquired.is_ok());
    }
}
