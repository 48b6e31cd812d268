//! Fail-fast execution of several features in dependency order.

use std::path::Path;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::core::feature::FeatureDescriptor;
use crate::core::types::{ChainEntry, ChainResult, ChainStatus, SkipReason};
use crate::executor::{ExecutionContext, StepExecutor, elapsed_ms};
use crate::io::command::CommandRunner;
use crate::io::manifest_store::ManifestStore;
use crate::io::writer::ArtifactWriter;

/// Run `features` (already topologically ordered) one after another.
///
/// Each feature is validated against a fresh scan, so earlier installs
/// satisfy later requirements. The first feature that does not succeed halts
/// the chain; every later feature is recorded as skipped without being
/// scanned or validated. `on_entry` sees each entry as soon as it is final.
#[instrument(skip_all, fields(features = features.len(), root = %root.display()))]
pub fn run_chain<R, W, M, F>(
    executor: &StepExecutor<R, W, M>,
    features: &[&FeatureDescriptor],
    root: &Path,
    context: &ExecutionContext,
    mut on_entry: F,
) -> ChainResult
where
    R: CommandRunner,
    W: ArtifactWriter,
    M: ManifestStore,
    F: FnMut(&ChainEntry),
{
    let start = Instant::now();
    let mut per_feature = Vec::with_capacity(features.len());
    let mut halted = false;

    for feature in features {
        let entry = if halted {
            ChainEntry::Skipped {
                feature_name: feature.name.to_string(),
                reason: SkipReason::EarlierFailure,
            }
        } else {
            let result = executor.run(feature, root, context);
            if !result.is_success() {
                warn!(feature = feature.name, outcome = ?result.outcome, "halting chain");
                halted = true;
            }
            ChainEntry::Executed(result)
        };
        on_entry(&entry);
        per_feature.push(entry);
    }

    let status = if halted {
        ChainStatus::HaltedOnFailure
    } else {
        ChainStatus::Completed
    };
    info!(?status, "chain finished");
    ChainResult {
        status,
        per_feature,
        total_elapsed_ms: elapsed_ms(start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{AUTH, CORE, DATABASE, PAYMENTS, TESTING};
    use crate::core::error::Violation;
    use crate::core::state::Flag;
    use crate::core::types::{FeatureState, Outcome};
    use crate::io::manifest_store::PackageJsonStore;
    use crate::io::scanner::scan;
    use crate::test_support::{RecordingWriter, ScriptedRunner, TestProject, default_context};

    fn states(result: &ChainResult) -> Vec<(&str, FeatureState)> {
        result
            .per_feature
            .iter()
            .map(|entry| (entry.feature_name(), entry.state()))
            .collect()
    }

    #[test]
    fn fresh_directory_chain_installs_everything() {
        let project = TestProject::new();
        let runner = ScriptedRunner::new();
        let writer = RecordingWriter::new();
        let executor = StepExecutor::new(&runner, &writer, PackageJsonStore);

        let mut seen = Vec::new();
        let result = run_chain(
            &executor,
            &[&CORE, &DATABASE, &AUTH, &PAYMENTS],
            project.path(),
            &default_context(),
            |entry| seen.push(entry.feature_name().to_string()),
        );

        assert_eq!(result.status, ChainStatus::Completed);
        assert!(result.failure().is_none());
        assert_eq!(seen, vec!["core", "database", "auth", "payments"]);
        let state = scan(project.path());
        for flag in [
            Flag::BaseProject,
            Flag::Database,
            Flag::Authentication,
            Flag::Payments,
        ] {
            assert!(state.get(flag), "{flag} should be detected");
        }
    }

    #[test]
    fn write_failure_halts_and_skips_the_rest() {
        let project = TestProject::new();
        let runner = ScriptedRunner::new();
        let writer = RecordingWriter::new().fail_on("prisma/schema.prisma");
        let executor = StepExecutor::new(&runner, &writer, PackageJsonStore);

        let result = run_chain(
            &executor,
            &[&CORE, &DATABASE, &AUTH, &PAYMENTS],
            project.path(),
            &default_context(),
            |_| {},
        );

        assert_eq!(result.status, ChainStatus::HaltedOnFailure);
        assert_eq!(
            states(&result),
            vec![
                ("core", FeatureState::Succeeded),
                ("database", FeatureState::Failed),
                ("auth", FeatureState::Skipped),
                ("payments", FeatureState::Skipped),
            ]
        );
        let failure = result.failure().expect("failure");
        assert_eq!(failure.feature_name, "database");
        assert_eq!(failure.failed_at(), Some(2));
        assert_eq!(result.skipped(), vec!["auth", "payments"]);

        // Core stays installed; nothing is rolled back.
        assert!(scan(project.path()).get(Flag::BaseProject));
    }

    #[test]
    fn rejection_halts_the_chain() {
        let project = TestProject::new().with_manifest(&["next", "vitest"]);
        let runner = ScriptedRunner::new();
        let writer = RecordingWriter::new();
        let executor = StepExecutor::new(&runner, &writer, PackageJsonStore);

        let result = run_chain(
            &executor,
            &[&TESTING, &DATABASE],
            project.path(),
            &default_context(),
            |_| {},
        );

        assert_eq!(result.status, ChainStatus::HaltedOnFailure);
        let first = result.per_feature[0].execution().expect("executed");
        assert_eq!(first.outcome, Outcome::Conflict);
        assert_eq!(
            first.violation,
            Some(Violation::Conflict {
                flag: Flag::Testing
            })
        );
        assert_eq!(result.per_feature[1].state(), FeatureState::Skipped);
        assert!(runner.calls().is_empty());
        assert!(writer.writes().is_empty());
    }

    #[test]
    fn empty_chain_completes() {
        let project = TestProject::new();
        let executor =
            StepExecutor::new(ScriptedRunner::new(), RecordingWriter::new(), PackageJsonStore);
        let result = run_chain(&executor, &[], project.path(), &default_context(), |_| {});
        assert_eq!(result.status, ChainStatus::Completed);
        assert!(result.per_feature.is_empty());
    }
}
