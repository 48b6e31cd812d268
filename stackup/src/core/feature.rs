//! Static feature descriptors and the steps they are made of.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::artifact::Artifact;
use crate::core::manifest::ManifestPatch;
use crate::core::state::Flag;

/// A named unit of project setup with declared requirements and ordered steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDescriptor {
    pub name: &'static str,
    pub summary: &'static str,
    /// Flags that must be true before this feature may run.
    pub requires: &'static [Flag],
    /// Flag whose truth means the feature is already installed.
    pub conflict_flag: Flag,
    pub steps: &'static [StepSpec],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSpec {
    pub name: &'static str,
    pub action: StepAction,
}

impl StepSpec {
    pub const fn new(name: &'static str, action: StepAction) -> Self {
        Self { name, action }
    }

    pub fn kind(&self) -> StepKind {
        self.action.kind()
    }
}

/// Payload of a step; opaque to everything except the executor's dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    InstallPackages(CommandSpec),
    WriteArtifact(Artifact),
    PatchManifest(ManifestPatch),
}

impl StepAction {
    pub fn kind(&self) -> StepKind {
        match self {
            StepAction::InstallPackages(_) => StepKind::InstallPackages,
            StepAction::WriteArtifact(_) => StepKind::WriteArtifact,
            StepAction::PatchManifest(_) => StepKind::PatchManifest,
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            StepAction::WriteArtifact(artifact) => Some(artifact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    InstallPackages,
    WriteArtifact,
    PatchManifest,
}

/// Package-manager command, rendered to a shell string at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSpec {
    /// Add packages to the manifest and install them.
    Add {
        packages: &'static [&'static str],
        dev: bool,
    },
    /// Install everything the manifest declares.
    InstallAll,
    /// Run a binary provided by an installed package.
    Exec(&'static str),
}

impl CommandSpec {
    pub fn render(&self, pm: PackageManager) -> String {
        match self {
            CommandSpec::Add { packages, dev } => {
                let mut parts = vec![pm.add_prefix(*dev)];
                parts.extend(packages.iter().copied());
                parts.join(" ")
            }
            CommandSpec::InstallAll => format!("{pm} install"),
            CommandSpec::Exec(command) => format!("{} {command}", pm.exec_prefix()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    fn add_prefix(self, dev: bool) -> &'static str {
        match (self, dev) {
            (PackageManager::Npm, false) => "npm install",
            (PackageManager::Npm, true) => "npm install --save-dev",
            (PackageManager::Pnpm, false) => "pnpm add",
            (PackageManager::Pnpm, true) => "pnpm add -D",
            (PackageManager::Yarn, false) => "yarn add",
            (PackageManager::Yarn, true) => "yarn add --dev",
            (PackageManager::Bun, false) => "bun add",
            (PackageManager::Bun, true) => "bun add --dev",
        }
    }

    fn exec_prefix(self) -> &'static str {
        match self {
            PackageManager::Npm => "npx",
            PackageManager::Pnpm => "pnpm exec",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bunx",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "npm" => Ok(PackageManager::Npm),
            "pnpm" => Ok(PackageManager::Pnpm),
            "yarn" => Ok(PackageManager::Yarn),
            "bun" => Ok(PackageManager::Bun),
            other => Err(format!(
                "unsupported package manager '{other}' (expected npm, pnpm, yarn or bun)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_add_commands_per_package_manager() {
        let spec = CommandSpec::Add {
            packages: &["vitest", "jsdom"],
            dev: true,
        };
        assert_eq!(
            spec.render(PackageManager::Npm),
            "npm install --save-dev vitest jsdom"
        );
        assert_eq!(spec.render(PackageManager::Pnpm), "pnpm add -D vitest jsdom");
        assert_eq!(spec.render(PackageManager::Yarn), "yarn add --dev vitest jsdom");
    }

    #[test]
    fn renders_exec_and_install_all() {
        assert_eq!(
            CommandSpec::Exec("prisma generate").render(PackageManager::Npm),
            "npx prisma generate"
        );
        assert_eq!(
            CommandSpec::Exec("prisma generate").render(PackageManager::Bun),
            "bunx prisma generate"
        );
        assert_eq!(
            CommandSpec::InstallAll.render(PackageManager::Pnpm),
            "pnpm install"
        );
    }

    #[test]
    fn parses_package_manager_names() {
        assert_eq!("yarn".parse::<PackageManager>(), Ok(PackageManager::Yarn));
        assert!("cargo".parse::<PackageManager>().is_err());
    }
}
