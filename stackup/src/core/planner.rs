//! Dry-run planning for a chain of features.
//!
//! The planner validates each feature against a projected state: once a
//! feature is judged ready, its conflict flag is assumed set for the features
//! after it. The first rejection blocks everything that follows, the same way
//! a chain run halts.

use serde::Serialize;

use crate::core::error::Violation;
use crate::core::feature::{FeatureDescriptor, StepKind};
use crate::core::state::ProjectState;
use crate::core::validator::validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// State observed on disk before anything would run.
    pub initial_state: ProjectState,
    pub entries: Vec<PlanEntry>,
    /// State expected after every ready feature succeeds.
    pub projected_state: ProjectState,
}

impl Plan {
    /// True if every feature would pass validation.
    pub fn is_runnable(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.verdict == PlanVerdict::Ready)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub feature_name: String,
    pub verdict: PlanVerdict,
    pub steps: Vec<PlannedStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PlanVerdict {
    Ready,
    Rejected { violation: Violation },
    /// An earlier feature was rejected, so this one would be skipped.
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStep {
    pub name: String,
    pub kind: StepKind,
}

/// Plan `features` (already in execution order) against `state`.
pub fn plan(features: &[&FeatureDescriptor], state: &ProjectState) -> Plan {
    let mut projected = state.clone();
    let mut blocked = false;
    let mut entries = Vec::with_capacity(features.len());

    for feature in features {
        let verdict = if blocked {
            PlanVerdict::Blocked
        } else {
            match validate(feature, &projected) {
                Ok(()) => {
                    projected = projected.with(feature.conflict_flag, true);
                    PlanVerdict::Ready
                }
                Err(violation) => {
                    blocked = true;
                    PlanVerdict::Rejected { violation }
                }
            }
        };
        entries.push(PlanEntry {
            feature_name: feature.name.to_string(),
            verdict,
            steps: feature
                .steps
                .iter()
                .map(|step| PlannedStep {
                    name: step.name.to_string(),
                    kind: step.kind(),
                })
                .collect(),
        });
    }

    Plan {
        initial_state: state.clone(),
        entries,
        projected_state: projected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{AUTH, CORE, DATABASE, PAYMENTS, TESTING};
    use crate::core::state::Flag;

    #[test]
    fn fresh_directory_chain_is_fully_ready() {
        let plan = plan(&[&CORE, &DATABASE, &AUTH, &PAYMENTS], &ProjectState::empty());
        assert!(plan.is_runnable());
        assert_eq!(
            plan.projected_state.active(),
            vec![
                Flag::BaseProject,
                Flag::Database,
                Flag::Authentication,
                Flag::Payments
            ]
        );
        assert_eq!(plan.entries[1].steps.len(), 6);
        assert!(plan.initial_state.active().is_empty());
    }

    #[test]
    fn first_rejection_blocks_the_rest() {
        let plan = plan(&[&DATABASE, &AUTH, &TESTING], &ProjectState::empty());
        assert_eq!(
            plan.entries[0].verdict,
            PlanVerdict::Rejected {
                violation: Violation::MissingRequirement {
                    missing: Flag::BaseProject
                }
            }
        );
        assert_eq!(plan.entries[1].verdict, PlanVerdict::Blocked);
        assert_eq!(plan.entries[2].verdict, PlanVerdict::Blocked);
        assert!(!plan.is_runnable());
        assert_eq!(plan.projected_state, ProjectState::empty());
    }

    #[test]
    fn already_installed_feature_is_a_conflict() {
        let state = ProjectState::from_active([Flag::BaseProject]);
        let plan = plan(&[&CORE], &state);
        assert_eq!(
            plan.entries[0].verdict,
            PlanVerdict::Rejected {
                violation: Violation::Conflict {
                    flag: Flag::BaseProject
                }
            }
        );
    }
}
