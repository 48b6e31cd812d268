//! Error taxonomy for validation and execution.
//!
//! Validation-time errors (`UnknownFeature`, `Precondition`, `Conflict`) are
//! raised before any side effect. Execution-time errors are recorded on the
//! failing [`StepResult`](crate::core::types::StepResult) together with the
//! steps that already completed.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::state::Flag;

/// Why a feature may not be installed into the current project state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    /// The feature's own marker flag is already set.
    #[error("already installed ({flag} is detected)")]
    Conflict { flag: Flag },
    /// A required flag is not set. Only the first missing one is reported.
    #[error("requires {missing}, which is not detected")]
    MissingRequirement { missing: Flag },
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("unknown feature '{name}' (known: {known})")]
    UnknownFeature { name: String, known: String },

    #[error("feature '{feature}' requires {missing}, which is not detected")]
    Precondition { feature: String, missing: Flag },

    #[error("feature '{feature}' is already installed ({flag} is detected)")]
    Conflict { feature: String, flag: Flag },

    #[error("command `{command}` failed: {detail}")]
    CommandExecution {
        command: String,
        exit_code: Option<i32>,
        detail: String,
    },

    #[error("write artifact {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("render artifact {path}: {reason}")]
    ArtifactRender { path: String, reason: String },

    #[error("patch manifest: {0}")]
    ManifestPatch(#[from] ManifestError),

    #[error("lock project {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub fn from_violation(feature: &str, violation: Violation) -> Self {
        match violation {
            Violation::Conflict { flag } => Self::Conflict {
                feature: feature.to_string(),
                flag,
            },
            Violation::MissingRequirement { missing } => Self::Precondition {
                feature: feature.to_string(),
                missing,
            },
        }
    }

    /// True for errors that are guaranteed to have happened before any mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownFeature { .. } | Self::Precondition { .. } | Self::Conflict { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("manifest root must be a JSON object")]
    NotAnObject,

    #[error("manifest schema validation failed: {0}")]
    Schema(String),

    #[error("manifest section '{0}' must be an object")]
    SectionNotAnObject(&'static str),

    #[error("manifest field '{key}': {reason}")]
    Field { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("feature '{0}' is declared more than once")]
    DuplicateFeature(String),

    #[error("feature requirements form a cycle through: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_converts_to_matching_install_error() {
        let err = InstallError::from_violation(
            "database",
            Violation::MissingRequirement {
                missing: Flag::BaseProject,
            },
        );
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "feature 'database' requires hasBaseProject, which is not detected"
        );

        let err = InstallError::from_violation(
            "auth",
            Violation::Conflict {
                flag: Flag::Authentication,
            },
        );
        assert!(matches!(err, InstallError::Conflict { .. }));
    }

    #[test]
    fn violation_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Violation::MissingRequirement {
            missing: Flag::Database,
        })
        .expect("serialize");
        assert_eq!(
            json,
            "{\"kind\":\"missingRequirement\",\"missing\":\"hasDatabase\"}"
        );
    }
}
