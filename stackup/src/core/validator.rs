//! Precondition and conflict gate, evaluated before any step runs.

use crate::core::error::Violation;
use crate::core::feature::FeatureDescriptor;
use crate::core::state::ProjectState;

/// Decide whether `feature` may be installed into a project in `state`.
///
/// Conflict is checked first. Requirements are checked in declared order and
/// only the first missing one is reported.
pub fn validate(feature: &FeatureDescriptor, state: &ProjectState) -> Result<(), Violation> {
    if state.get(feature.conflict_flag) {
        return Err(Violation::Conflict {
            flag: feature.conflict_flag,
        });
    }
    match feature.requires.iter().find(|flag| !state.get(**flag)) {
        Some(missing) => Err(Violation::MissingRequirement { missing: *missing }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Flag;

    const TEAMS: FeatureDescriptor = FeatureDescriptor {
        name: "teams",
        summary: "team management",
        requires: &[Flag::Authentication, Flag::Database],
        conflict_flag: Flag::TeamManagement,
        steps: &[],
    };

    #[test]
    fn ok_when_requirements_met() {
        let state = ProjectState::from_active([Flag::Authentication, Flag::Database]);
        assert_eq!(validate(&TEAMS, &state), Ok(()));
    }

    #[test]
    fn conflict_wins_over_missing_requirements() {
        let state = ProjectState::from_active([Flag::TeamManagement]);
        assert_eq!(
            validate(&TEAMS, &state),
            Err(Violation::Conflict {
                flag: Flag::TeamManagement
            })
        );
    }

    #[test]
    fn reports_only_first_missing_requirement() {
        let state = ProjectState::empty();
        assert_eq!(
            validate(&TEAMS, &state),
            Err(Violation::MissingRequirement {
                missing: Flag::Authentication
            })
        );

        let state = ProjectState::from_active([Flag::Authentication]);
        assert_eq!(
            validate(&TEAMS, &state),
            Err(Violation::MissingRequirement {
                missing: Flag::Database
            })
        );
    }

    #[test]
    fn repeated_validation_is_stable() {
        let state = ProjectState::from_active([Flag::Database]);
        let first = validate(&TEAMS, &state);
        for _ in 0..5 {
            assert_eq!(validate(&TEAMS, &state), first);
        }
        assert_eq!(state, ProjectState::from_active([Flag::Database]));
    }

    #[test]
    fn every_flag_combination_yields_a_verdict() {
        for bits in 0u32..(1 << Flag::ALL.len()) {
            let state = ProjectState::from_active(
                Flag::ALL
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| bits & (1 << i) != 0)
                    .map(|(_, flag)| *flag),
            );
            let verdict = validate(&TEAMS, &state);
            if state.get(Flag::TeamManagement) {
                assert!(matches!(verdict, Err(Violation::Conflict { .. })));
            } else if state.get(Flag::Authentication) && state.get(Flag::Database) {
                assert_eq!(verdict, Ok(()));
            } else {
                assert!(matches!(verdict, Err(Violation::MissingRequirement { .. })));
            }
        }
    }
}
