//! Project-state detection from files on disk.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::core::evidence::{Evidence, evidence_for};
use crate::core::manifest::ManifestDoc;
use crate::core::state::{Flag, ProjectState};
use crate::io::manifest_store::{ManifestStore, PackageJsonStore};

/// Infer which features are present in `root`.
///
/// Never fails. A missing or non-directory root and an unparseable manifest
/// both yield the all-false state; an absent manifest only disables the
/// package-based evidence.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn scan(root: &Path) -> ProjectState {
    if !root.is_dir() {
        debug!("project root missing, reporting empty state");
        return ProjectState::empty();
    }
    let manifest = match PackageJsonStore.load(root) {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!(err = %err, "manifest unreadable, reporting empty state");
            return ProjectState::empty();
        }
    };

    let state = Flag::ALL.iter().fold(ProjectState::empty(), |state, flag| {
        let present = evidence_for(*flag)
            .iter()
            .any(|evidence| observed(root, manifest.as_ref(), evidence));
        state.with(*flag, present)
    });
    debug!(active = ?state.active(), "scan complete");
    state
}

fn observed(root: &Path, manifest: Option<&ManifestDoc>, evidence: &Evidence) -> bool {
    match evidence {
        Evidence::Package(name) => manifest.is_some_and(|doc| doc.has_package(name)),
        Evidence::File(path) => root.join(path).is_file(),
        Evidence::Dir(path) => root.join(path).is_dir(),
    }
}
