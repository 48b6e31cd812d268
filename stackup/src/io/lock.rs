//! Per-project advisory lock held for the duration of an install.
//!
//! The lock file lives in the OS temp directory, named after a hash of the
//! canonical project path, so taking it never touches the project itself.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::error::InstallError;

/// Exclusive lock on a project directory. Released on drop.
#[derive(Debug)]
pub struct ProjectLock {
    path: PathBuf,
    _file: File,
}

impl ProjectLock {
    /// Take the lock, failing immediately if another process holds it.
    pub fn acquire(root: &Path) -> Result<Self, InstallError> {
        let path = lock_path(root);
        let lock_error = |source| InstallError::Lock {
            path: path.clone(),
            source,
        };
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(lock_error)?;
        file.try_lock_exclusive().map_err(lock_error)?;
        debug!(lock = %path.display(), project = %root.display(), "project lock acquired");
        Ok(Self { path, _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lock file location for `root`.
///
/// Every spelling of an existing directory (`..`, symlinks) maps to the same
/// file. A root that does not exist yet falls back to its absolute path.
pub fn lock_path(root: &Path) -> PathBuf {
    let key = fs::canonicalize(root)
        .or_else(|_| std::path::absolute(root))
        .unwrap_or_else(|_| root.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(key.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    std::env::temp_dir().join(format!("stackup-{}.lock", hex::encode(&digest[..8])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let temp = tempfile::tempdir().expect("tempdir");
        let held = ProjectLock::acquire(temp.path()).expect("first lock");
        let err = ProjectLock::acquire(temp.path()).unwrap_err();
        assert!(matches!(err, InstallError::Lock { .. }));
        drop(held);
        ProjectLock::acquire(temp.path()).expect("lock after release");
    }

    #[test]
    fn lock_file_stays_out_of_the_project() {
        let temp = tempfile::tempdir().expect("tempdir");
        let lock = ProjectLock::acquire(temp.path()).expect("lock");
        assert!(!lock.path().starts_with(temp.path()));
        assert_eq!(fs::read_dir(temp.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn aliased_paths_share_one_lock() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("sub")).expect("mkdir");
        let aliased = temp.path().join("sub").join("..");
        assert_eq!(lock_path(temp.path()), lock_path(&aliased));

        let _held = ProjectLock::acquire(temp.path()).expect("first lock");
        let err = ProjectLock::acquire(&aliased).unwrap_err();
        assert!(matches!(err, InstallError::Lock { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_project_shares_the_lock() {
        let temp = tempfile::tempdir().expect("tempdir");
        let project = temp.path().join("project");
        fs::create_dir(&project).expect("mkdir");
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&project, &link).expect("symlink");
        assert_eq!(lock_path(&project), lock_path(&link));
    }

    #[test]
    fn missing_root_still_gets_a_lock_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("not-yet");
        assert_eq!(lock_path(&missing), lock_path(&missing));
        assert_ne!(lock_path(&missing), lock_path(temp.path()));
    }

    #[test]
    fn distinct_projects_get_distinct_locks() {
        let a = tempfile::tempdir().expect("tempdir");
        let b = tempfile::tempdir().expect("tempdir");
        assert_ne!(lock_path(a.path()), lock_path(b.path()));
        assert_eq!(lock_path(a.path()), lock_path(a.path()));
    }
}
