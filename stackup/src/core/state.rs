//! Feature flags and the immutable project-state snapshot derived from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A boolean fact about a project, inferred by the scanner.
///
/// Variant order is the canonical order used when serializing a
/// [`ProjectState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Flag {
    #[serde(rename = "hasBaseProject")]
    BaseProject,
    #[serde(rename = "hasDatabase")]
    Database,
    #[serde(rename = "hasAuthentication")]
    Authentication,
    #[serde(rename = "hasPayments")]
    Payments,
    #[serde(rename = "hasTeamManagement")]
    TeamManagement,
    #[serde(rename = "hasTesting")]
    Testing,
    #[serde(rename = "hasI18n")]
    I18n,
    #[serde(rename = "hasEditorConfig")]
    EditorConfig,
    #[serde(rename = "hasEnvConfig")]
    EnvConfig,
}

impl Flag {
    pub const ALL: [Flag; 9] = [
        Flag::BaseProject,
        Flag::Database,
        Flag::Authentication,
        Flag::Payments,
        Flag::TeamManagement,
        Flag::Testing,
        Flag::I18n,
        Flag::EditorConfig,
        Flag::EnvConfig,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::BaseProject => "hasBaseProject",
            Flag::Database => "hasDatabase",
            Flag::Authentication => "hasAuthentication",
            Flag::Payments => "hasPayments",
            Flag::TeamManagement => "hasTeamManagement",
            Flag::Testing => "hasTesting",
            Flag::I18n => "hasI18n",
            Flag::EditorConfig => "hasEditorConfig",
            Flag::EnvConfig => "hasEnvConfig",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of which features are detected in a project directory.
///
/// Every flag is always present. Values are never patched in place: callers
/// re-scan after mutating the project, and the builder-style [`ProjectState::with`]
/// returns a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectState {
    flags: BTreeMap<Flag, bool>,
}

impl ProjectState {
    /// State of a fresh directory: every flag false.
    pub fn empty() -> Self {
        Self {
            flags: Flag::ALL.iter().map(|flag| (*flag, false)).collect(),
        }
    }

    /// Build a state where exactly the given flags are true.
    pub fn from_active(active: impl IntoIterator<Item = Flag>) -> Self {
        active
            .into_iter()
            .fold(Self::empty(), |state, flag| state.with(flag, true))
    }

    pub fn with(mut self, flag: Flag, value: bool) -> Self {
        self.flags.insert(flag, value);
        self
    }

    pub fn get(&self, flag: Flag) -> bool {
        self.flags.get(&flag).copied().unwrap_or(false)
    }

    /// Flags currently true, in canonical order.
    pub fn active(&self) -> Vec<Flag> {
        self.flags
            .iter()
            .filter(|(_, value)| **value)
            .map(|(flag, _)| *flag)
            .collect()
    }
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_has_every_flag_false() {
        let state = ProjectState::empty();
        assert!(Flag::ALL.iter().all(|flag| !state.get(*flag)));
        assert!(state.active().is_empty());
    }

    #[test]
    fn with_returns_new_snapshot() {
        let before = ProjectState::empty();
        let after = before.clone().with(Flag::Database, true);
        assert!(!before.get(Flag::Database));
        assert!(after.get(Flag::Database));
    }

    #[test]
    fn serializes_flags_in_canonical_order() {
        let state = ProjectState::from_active([Flag::EnvConfig, Flag::BaseProject]);
        let json = serde_json::to_string(&state).expect("serialize");
        assert!(json.starts_with("{\"hasBaseProject\":true,\"hasDatabase\":false"));
        assert!(json.ends_with("\"hasEnvConfig\":true}"));
    }

    #[test]
    fn display_matches_serialized_name() {
        for flag in Flag::ALL {
            let json = serde_json::to_string(&flag).expect("serialize");
            assert_eq!(json, format!("\"{flag}\""));
        }
    }
}
