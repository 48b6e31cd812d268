//! Artifact-writer seam for `writeArtifact` steps.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use crate::core::error::InstallError;

/// Persists rendered artifacts under a project root.
pub trait ArtifactWriter {
    /// Write `contents` to `relative` under `root`, creating parent
    /// directories. Returns the absolute path written.
    fn write(&self, root: &Path, relative: &str, contents: &[u8]) -> Result<PathBuf, InstallError>;
}

impl<T: ArtifactWriter + ?Sized> ArtifactWriter for &T {
    fn write(&self, root: &Path, relative: &str, contents: &[u8]) -> Result<PathBuf, InstallError> {
        (**self).write(root, relative, contents)
    }
}

/// Writes files atomically (temp sibling + rename), so a failed write never
/// leaves a partial file behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactWriter;

impl ArtifactWriter for FsArtifactWriter {
    #[instrument(skip_all, fields(relative = %relative, bytes = contents.len()))]
    fn write(&self, root: &Path, relative: &str, contents: &[u8]) -> Result<PathBuf, InstallError> {
        let path = resolve_within(root, relative)?;
        write_atomic(&path, contents).map_err(|source| InstallError::ArtifactWrite {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "artifact written");
        Ok(path)
    }
}

/// Join `relative` onto `root`, refusing anything that would escape it.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf, InstallError> {
    let candidate = Path::new(relative);
    let escapes = relative.is_empty()
        || candidate
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(InstallError::ArtifactWrite {
            path: candidate.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "artifact path must be relative and stay inside the project",
            ),
        });
    }
    Ok(root.join(candidate))
}

pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    fs::create_dir_all(parent)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".stackup.tmp");
    let tmp_path = parent.join(tmp_name);
    if let Err(err) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}
