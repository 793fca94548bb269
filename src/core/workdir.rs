// src/core/workdir.rs
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::error::{CallsliceError, Result};

/// Scoped change of the process working directory
///
/// The previous directory is restored by [`WorkdirGuard::restore`], or by
/// `Drop` on any path that never reaches it.
#[derive(Debug)]
pub struct WorkdirGuard {
    previous: PathBuf,
    restored: bool,
}

impl WorkdirGuard {
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous =
            std::env::current_dir().map_err(|source| CallsliceError::WorkingDirectoryFailure {
                path: dir.to_path_buf(),
                source,
            })?;
        std::env::set_current_dir(dir).map_err(|source| {
            CallsliceError::WorkingDirectoryFailure {
                path: dir.to_path_buf(),
                source,
            }
        })?;
        debug!("Entered {} (was {})", dir.display(), previous.display());

        Ok(Self {
            previous,
            restored: false,
        })
    }

    /// Restore the previous directory, reporting failure to the caller
    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        self.change_back()
    }

    fn change_back(&self) -> Result<()> {
        std::env::set_current_dir(&self.previous).map_err(|source| {
            CallsliceError::WorkingDirectoryFailure {
                path: self.previous.clone(),
                source,
            }
        })
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.change_back() {
            error!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only unit test that changes the process working directory
    #[test]
    fn enter_restore_and_drop() {
        let original = std::env::current_dir().unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().canonicalize().unwrap();

        let guard = WorkdirGuard::enter(&target).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), target);
        guard.restore().unwrap();
        assert_eq!(std::env::current_dir().unwrap(), original);

        {
            let _guard = WorkdirGuard::enter(&target).unwrap();
            assert_eq!(std::env::current_dir().unwrap(), target);
        }
        assert_eq!(std::env::current_dir().unwrap(), original);

        let missing = target.join("missing");
        let err = WorkdirGuard::enter(&missing).unwrap_err();
        assert!(matches!(err, CallsliceError::WorkingDirectoryFailure { .. }));
        assert_eq!(std::env::current_dir().unwrap(), original);
    }
}
