//! Single-feature execution: scan, validate, then run steps in order.
//!
//! The executor never returns an error. Validation rejections and step
//! failures are both recorded on the [`ExecutionResult`]; steps that already
//! completed are not rolled back.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::core::artifact::RenderParams;
use crate::core::error::InstallError;
use crate::core::feature::{FeatureDescriptor, PackageManager, StepAction, StepSpec};
use crate::core::manifest::ManifestDoc;
use crate::core::types::{ExecutionResult, FeatureState, StepResult};
use crate::core::validator::validate;
use crate::io::command::CommandRunner;
use crate::io::manifest_store::ManifestStore;
use crate::io::scanner::scan;
use crate::io::writer::ArtifactWriter;

/// Resolved inputs shared by every step of an invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    pub package_manager: PackageManager,
    pub params: RenderParams,
}

pub struct StepExecutor<R, W, M> {
    runner: R,
    writer: W,
    manifests: M,
}

impl<R, W, M> StepExecutor<R, W, M>
where
    R: CommandRunner,
    W: ArtifactWriter,
    M: ManifestStore,
{
    pub fn new(runner: R, writer: W, manifests: M) -> Self {
        Self {
            runner,
            writer,
            manifests,
        }
    }

    /// Run `feature` against the project at `root`.
    ///
    /// The project is scanned fresh on every call. A rejected feature performs
    /// no side effects; otherwise steps run in declared order and the first
    /// failing step ends the invocation.
    #[instrument(skip_all, fields(feature = feature.name, root = %root.display()))]
    pub fn run(
        &self,
        feature: &FeatureDescriptor,
        root: &Path,
        context: &ExecutionContext,
    ) -> ExecutionResult {
        let start = Instant::now();
        debug!(state = ?FeatureState::Validating, "validating");
        let state = scan(root);
        if let Err(violation) = validate(feature, &state) {
            warn!(state = ?FeatureState::Rejected, %violation, "feature rejected");
            return ExecutionResult::rejected(feature.name, violation, elapsed_ms(start));
        }

        info!(state = ?FeatureState::Running, steps = feature.steps.len(), "running steps");
        let mut completed = Vec::with_capacity(feature.steps.len());
        for (index, step) in feature.steps.iter().enumerate() {
            let step_start = Instant::now();
            match self.dispatch(step, root, context) {
                Ok(output) => {
                    debug!(step = step.name, position = index + 1, "step completed");
                    completed
                        .push(StepResult::passed(step, elapsed_ms(step_start)).with_output(output));
                }
                Err(err) => {
                    warn!(
                        step = step.name,
                        position = index + 1,
                        err = %err,
                        state = ?FeatureState::Failed,
                        "step failed"
                    );
                    let failed = StepResult::failed(step, elapsed_ms(step_start), err.to_string());
                    return ExecutionResult::step_failed(
                        feature.name,
                        completed,
                        failed,
                        elapsed_ms(start),
                    );
                }
            }
        }

        info!(state = ?FeatureState::Succeeded, "feature installed");
        ExecutionResult::succeeded(feature.name, completed, elapsed_ms(start))
    }

    /// Perform one step. Returns the command output for `installPackages`.
    fn dispatch(
        &self,
        step: &StepSpec,
        root: &Path,
        context: &ExecutionContext,
    ) -> Result<Option<String>, InstallError> {
        match &step.action {
            StepAction::InstallPackages(command) => {
                let rendered = command.render(context.package_manager);
                Ok(self.runner.run(&rendered, root)?.summary())
            }
            StepAction::WriteArtifact(artifact) => {
                let relative = artifact.render_path(&context.params)?;
                let contents = artifact.render(&context.params)?;
                self.writer.write(root, &relative, &contents)?;
                Ok(None)
            }
            StepAction::PatchManifest(patch) => {
                let mut doc = self
                    .manifests
                    .load(root)?
                    .unwrap_or_else(ManifestDoc::empty);
                doc.apply(patch, &context.params)?;
                self.manifests.save(root, &doc)?;
                Ok(None)
            }
        }
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
