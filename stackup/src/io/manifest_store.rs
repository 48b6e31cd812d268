//! Reading and writing `package.json` under a project root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::core::error::ManifestError;
use crate::core::manifest::ManifestDoc;
use crate::io::writer::write_atomic;

pub const MANIFEST_FILE: &str = "package.json";

/// Load/save seam for the project manifest.
pub trait ManifestStore {
    /// `Ok(None)` when the project has no manifest file.
    fn load(&self, root: &Path) -> Result<Option<ManifestDoc>, ManifestError>;
    fn save(&self, root: &Path, doc: &ManifestDoc) -> Result<(), ManifestError>;
}

impl<T: ManifestStore + ?Sized> ManifestStore for &T {
    fn load(&self, root: &Path) -> Result<Option<ManifestDoc>, ManifestError> {
        (**self).load(root)
    }

    fn save(&self, root: &Path, doc: &ManifestDoc) -> Result<(), ManifestError> {
        (**self).save(root, doc)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PackageJsonStore;

impl PackageJsonStore {
    pub fn path(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILE)
    }
}

impl ManifestStore for PackageJsonStore {
    #[instrument(skip_all, fields(root = %root.display()))]
    fn load(&self, root: &Path) -> Result<Option<ManifestDoc>, ManifestError> {
        let path = Self::path(root);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no manifest present");
                return Ok(None);
            }
            Err(source) => return Err(ManifestError::Read { path, source }),
        };
        ManifestDoc::parse(&contents).map(Some)
    }

    #[instrument(skip_all, fields(root = %root.display()))]
    fn save(&self, root: &Path, doc: &ManifestDoc) -> Result<(), ManifestError> {
        let path = Self::path(root);
        let contents = doc.to_pretty_string()?;
        write_atomic(&path, contents.as_bytes())
            .map_err(|source| ManifestError::Write { path, source })?;
        debug!("manifest saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::RenderParams;
    use crate::core::manifest::{ManifestPatch, ManifestSection};

    #[test]
    fn missing_manifest_loads_as_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(PackageJsonStore.load(temp.path()).expect("load").is_none());
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(MANIFEST_FILE), "{ not json").expect("seed");
        let err = PackageJsonStore.load(temp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn save_preserves_unrelated_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join(MANIFEST_FILE),
            "{\"name\":\"demo\",\"engines\":{\"node\":\">=20\"},\"scripts\":{\"dev\":\"next dev\"}}",
        )
        .expect("seed");

        let mut doc = PackageJsonStore
            .load(temp.path())
            .expect("load")
            .expect("present");
        doc.apply(
            &ManifestPatch::scripts(&[("test", "vitest run")]),
            &RenderParams::new(),
        )
        .expect("apply");
        PackageJsonStore.save(temp.path(), &doc).expect("save");

        let written = fs::read_to_string(temp.path().join(MANIFEST_FILE)).expect("read");
        assert!(written.ends_with("}\n"));
        let reloaded = ManifestDoc::parse(&written).expect("parse");
        assert_eq!(reloaded.entry(ManifestSection::Scripts, "dev"), Some("next dev"));
        assert_eq!(reloaded.entry(ManifestSection::Scripts, "test"), Some("vitest run"));
        assert!(written.contains("\"engines\""));
        assert!(written.find("\"name\"") < written.find("\"engines\""));
    }
}
