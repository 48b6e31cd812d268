//! Public entry points: scan, describe, plan and install.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use crate::chain::run_chain;
use crate::core::artifact::RenderParams;
use crate::core::error::InstallError;
use crate::core::feature::{FeatureDescriptor, PackageManager};
use crate::core::planner::{Plan, PlannedStep, plan};
use crate::core::registry::FeatureRegistry;
use crate::core::state::{Flag, ProjectState};
use crate::core::types::{ChainEntry, ChainResult, ExecutionResult};
use crate::executor::{ExecutionContext, StepExecutor};
use crate::io::command::{CommandRunner, ShellCommandRunner};
use crate::io::config::StackupConfig;
use crate::io::lock::ProjectLock;
use crate::io::manifest_store::{ManifestStore, PackageJsonStore};
use crate::io::scanner::scan;
use crate::io::writer::{ArtifactWriter, FsArtifactWriter};

/// Per-call overrides for an install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub package_manager: Option<PackageManager>,
    /// Template parameters; these win over config and built-in defaults.
    pub params: BTreeMap<String, String>,
}

/// Catalog entry as reported by `features`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSummary {
    pub name: String,
    pub summary: String,
    pub requires: Vec<Flag>,
    pub conflict_flag: Flag,
    pub steps: Vec<PlannedStep>,
}

impl From<&FeatureDescriptor> for FeatureSummary {
    fn from(feature: &FeatureDescriptor) -> Self {
        Self {
            name: feature.name.to_string(),
            summary: feature.summary.to_string(),
            requires: feature.requires.to_vec(),
            conflict_flag: feature.conflict_flag,
            steps: feature
                .steps
                .iter()
                .map(|step| PlannedStep {
                    name: step.name.to_string(),
                    kind: step.kind(),
                })
                .collect(),
        }
    }
}

pub type ShellInstaller = Installer<'static, ShellCommandRunner, FsArtifactWriter, PackageJsonStore>;

pub struct Installer<'r, R, W, M> {
    registry: &'r FeatureRegistry,
    executor: StepExecutor<R, W, M>,
    config: StackupConfig,
}

impl ShellInstaller {
    /// Installer over the built-in catalog that runs real commands.
    pub fn from_config(config: StackupConfig) -> Self {
        let runner = ShellCommandRunner::new(config.command_timeout(), config.output_limit_bytes);
        Installer::new(
            FeatureRegistry::builtin(),
            StepExecutor::new(runner, FsArtifactWriter, PackageJsonStore),
            config,
        )
    }
}

impl<'r, R, W, M> Installer<'r, R, W, M>
where
    R: CommandRunner,
    W: ArtifactWriter,
    M: ManifestStore,
{
    pub fn new(
        registry: &'r FeatureRegistry,
        executor: StepExecutor<R, W, M>,
        config: StackupConfig,
    ) -> Self {
        Self {
            registry,
            executor,
            config,
        }
    }

    pub fn scan(&self, root: &Path) -> ProjectState {
        scan(root)
    }

    pub fn features(&self) -> Vec<FeatureSummary> {
        self.registry
            .features()
            .iter()
            .map(FeatureSummary::from)
            .collect()
    }

    /// Dry run: order `names` and validate them against the projected state.
    pub fn plan<S: AsRef<str>>(&self, names: &[S], root: &Path) -> Result<Plan, InstallError> {
        let ordered = self.registry.topological_order(names)?;
        Ok(plan(&ordered, &scan(root)))
    }

    /// Install a single feature.
    ///
    /// Only an unknown name or a held project lock is an `Err`; rejections
    /// and step failures are reported on the returned result.
    #[instrument(skip_all, fields(feature = name, root = %root.display()))]
    pub fn install(
        &self,
        name: &str,
        root: &Path,
        options: &InstallOptions,
    ) -> Result<ExecutionResult, InstallError> {
        let feature = self.registry.get(name)?;
        let _lock = ProjectLock::acquire(root)?;
        let context = self.context(root, options);
        let result = self.executor.run(feature, root, &context);
        info!(outcome = ?result.outcome, "install finished");
        Ok(result)
    }

    /// Install several features in dependency order, halting on the first
    /// that does not succeed. Unknown names fail before anything runs.
    #[instrument(skip_all, fields(features = names.len(), root = %root.display()))]
    pub fn install_all<S, F>(
        &self,
        names: &[S],
        root: &Path,
        options: &InstallOptions,
        on_entry: F,
    ) -> Result<ChainResult, InstallError>
    where
        S: AsRef<str>,
        F: FnMut(&ChainEntry),
    {
        let ordered = self.registry.topological_order(names)?;
        let _lock = ProjectLock::acquire(root)?;
        let context = self.context(root, options);
        Ok(run_chain(&self.executor, &ordered, root, &context, on_entry))
    }

    fn context(&self, root: &Path, options: &InstallOptions) -> ExecutionContext {
        let mut params = builtin_params(root);
        params.extend(self.config.params.clone());
        params.extend(options.params.clone());
        ExecutionContext {
            package_manager: options
                .package_manager
                .unwrap_or(self.config.package_manager),
            params,
        }
    }
}

/// Parameters every template may rely on.
pub fn builtin_params(root: &Path) -> RenderParams {
    let project_name = std::path::absolute(root)
        .ok()
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "app".to_string());
    RenderParams::from([
        ("project_name".to_string(), project_name),
        ("default_locale".to_string(), "en".to_string()),
        ("database_provider".to_string(), "postgresql".to_string()),
    ])
}
