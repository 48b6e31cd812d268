//! Progress reporting: projects results into tracing events.
//!
//! Control flow never logs step outcomes itself; callers hand finished
//! results to these functions.

use tracing::{info, warn};

use crate::core::types::{ChainEntry, ChainResult, ExecutionResult, Outcome};
use crate::exit_codes;

/// One event per completed step, plus one for the failure or rejection.
pub fn log_execution(result: &ExecutionResult) {
    for (index, step) in result.completed_steps.iter().enumerate() {
        info!(
            feature = %result.feature_name,
            step = %step.step_name,
            position = index + 1,
            elapsed_ms = step.elapsed_ms,
            "step ok"
        );
    }
    if let Some(failed) = &result.failed_step {
        warn!(
            feature = %result.feature_name,
            step = %failed.step_name,
            position = result.failed_at(),
            error = failed.error.as_deref().unwrap_or_default(),
            "step failed"
        );
    }
    if let Some(violation) = &result.violation {
        warn!(feature = %result.feature_name, %violation, "feature rejected");
    }
    info!(
        feature = %result.feature_name,
        outcome = ?result.outcome,
        elapsed_ms = result.total_elapsed_ms,
        "feature finished"
    );
}

pub fn log_chain_entry(entry: &ChainEntry) {
    match entry {
        ChainEntry::Executed(result) => log_execution(result),
        ChainEntry::Skipped {
            feature_name,
            reason,
        } => warn!(feature = %feature_name, ?reason, "feature skipped"),
    }
}

pub fn log_chain(result: &ChainResult) {
    info!(
        status = ?result.status,
        features = result.per_feature.len(),
        skipped = result.skipped().len(),
        elapsed_ms = result.total_elapsed_ms,
        "chain finished"
    );
}

/// Process exit code for a single-feature outcome.
pub fn exit_code(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Success => exit_codes::OK,
        Outcome::PreconditionFailed | Outcome::Conflict => exit_codes::REJECTED,
        Outcome::StepFailed => exit_codes::STEP_FAILED,
    }
}

/// Process exit code for a chain: that of the entry that halted it.
pub fn chain_exit_code(result: &ChainResult) -> i32 {
    result
        .failure()
        .map_or(exit_codes::OK, |failure| exit_code(failure.outcome))
}
