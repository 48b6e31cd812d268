//! Result records returned by the executor and the chain orchestrator.
//!
//! These are plain data: appended in execution order, never reordered, and
//! immutable once handed back to the caller.

use serde::{Deserialize, Serialize};

use crate::core::error::Violation;
use crate::core::feature::{StepKind, StepSpec};

/// Outcome of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_name: String,
    pub kind: StepKind,
    pub succeeded: bool,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Trimmed stdout of an `installPackages` command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl StepResult {
    pub fn passed(step: &StepSpec, elapsed_ms: u64) -> Self {
        Self {
            step_name: step.name.to_string(),
            kind: step.kind(),
            succeeded: true,
            elapsed_ms,
            error: None,
            output: None,
        }
    }

    pub fn with_output(mut self, output: Option<String>) -> Self {
        self.output = output;
        self
    }

    pub fn failed(step: &StepSpec, elapsed_ms: u64, error: String) -> Self {
        Self {
            step_name: step.name.to_string(),
            kind: step.kind(),
            succeeded: false,
            elapsed_ms,
            error: Some(error),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Success,
    PreconditionFailed,
    Conflict,
    StepFailed,
}

/// Everything a single feature invocation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub feature_name: String,
    pub outcome: Outcome,
    /// Steps that ran to completion, in declared order.
    pub completed_steps: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
    pub total_elapsed_ms: u64,
}

impl ExecutionResult {
    pub fn rejected(feature_name: &str, violation: Violation, total_elapsed_ms: u64) -> Self {
        let outcome = match violation {
            Violation::Conflict { .. } => Outcome::Conflict,
            Violation::MissingRequirement { .. } => Outcome::PreconditionFailed,
        };
        Self {
            feature_name: feature_name.to_string(),
            outcome,
            completed_steps: Vec::new(),
            failed_step: None,
            violation: Some(violation),
            total_elapsed_ms,
        }
    }

    pub fn succeeded(
        feature_name: &str,
        completed_steps: Vec<StepResult>,
        total_elapsed_ms: u64,
    ) -> Self {
        Self {
            feature_name: feature_name.to_string(),
            outcome: Outcome::Success,
            completed_steps,
            failed_step: None,
            violation: None,
            total_elapsed_ms,
        }
    }

    pub fn step_failed(
        feature_name: &str,
        completed_steps: Vec<StepResult>,
        failed_step: StepResult,
        total_elapsed_ms: u64,
    ) -> Self {
        Self {
            feature_name: feature_name.to_string(),
            outcome: Outcome::StepFailed,
            completed_steps,
            failed_step: Some(failed_step),
            violation: None,
            total_elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// 1-based position of the failing step in declared order.
    pub fn failed_at(&self) -> Option<usize> {
        self.failed_step
            .as_ref()
            .map(|_| self.completed_steps.len() + 1)
    }

    pub fn state(&self) -> FeatureState {
        match self.outcome {
            Outcome::Success => FeatureState::Succeeded,
            Outcome::PreconditionFailed | Outcome::Conflict => FeatureState::Rejected,
            Outcome::StepFailed => FeatureState::Failed,
        }
    }
}

/// Lifecycle of one feature within a chain run.
///
/// `NotStarted → Validating → {Rejected | Running} → {Succeeded | Failed}`;
/// features after a failure end in `Skipped` without leaving `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureState {
    NotStarted,
    Validating,
    Rejected,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl FeatureState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FeatureState::Rejected
                | FeatureState::Succeeded
                | FeatureState::Failed
                | FeatureState::Skipped
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    EarlierFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ChainEntry {
    Executed(ExecutionResult),
    #[serde(rename_all = "camelCase")]
    Skipped {
        feature_name: String,
        reason: SkipReason,
    },
}

impl ChainEntry {
    pub fn feature_name(&self) -> &str {
        match self {
            ChainEntry::Executed(result) => &result.feature_name,
            ChainEntry::Skipped { feature_name, .. } => feature_name,
        }
    }

    pub fn state(&self) -> FeatureState {
        match self {
            ChainEntry::Executed(result) => result.state(),
            ChainEntry::Skipped { .. } => FeatureState::Skipped,
        }
    }

    pub fn execution(&self) -> Option<&ExecutionResult> {
        match self {
            ChainEntry::Executed(result) => Some(result),
            ChainEntry::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainStatus {
    Completed,
    HaltedOnFailure,
}

/// Per-feature results of a chain, in the order features were considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResult {
    pub status: ChainStatus,
    pub per_feature: Vec<ChainEntry>,
    pub total_elapsed_ms: u64,
}

impl ChainResult {
    /// The single executed entry that did not succeed, if the chain halted.
    pub fn failure(&self) -> Option<&ExecutionResult> {
        self.per_feature
            .iter()
            .filter_map(ChainEntry::execution)
            .find(|result| !result.is_success())
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.per_feature
            .iter()
            .filter(|entry| entry.state() == FeatureState::Skipped)
            .map(ChainEntry::feature_name)
            .collect()
    }
}
