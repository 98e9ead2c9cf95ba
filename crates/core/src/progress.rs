use serde::Serialize;

use crate::model::{Milestone, MilestoneKey};

/// Where the current step falls within the milestone list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MilestonePosition {
    pub index: usize,
    pub key: MilestoneKey,
    /// Completion inside the active milestone, 0-100.
    pub phase_percent: f64,
}

/// Locates `current_step` within `milestones`.
///
/// The active milestone is the first whose inclusive range contains the step.
/// Steps outside every range fall back to the last milestone, with the phase
/// percentage clamped. Returns `None` only for an empty list.
#[must_use]
pub fn locate(milestones: &[Milestone], current_step: u32) -> Option<MilestonePosition> {
    let index = milestones
        .iter()
        .position(|m| m.step_range.contains(current_step))
        .or_else(|| milestones.len().checked_sub(1))?;
    let milestone = &milestones[index];

    Some(MilestonePosition {
        index,
        key: milestone.key,
        phase_percent: phase_percent(milestone, current_step),
    })
}

fn phase_percent(milestone: &Milestone, current_step: u32) -> f64 {
    let range = milestone.step_range;
    if range.is_empty() {
        return 100.0;
    }
    let done = f64::from(current_step) - f64::from(range.start) + 1.0;
    (done / f64::from(range.len()) * 100.0).clamp(0.0, 100.0)
}

/// Overall questionnaire completion, 0-100.
#[must_use]
pub fn overall_percent(current_step: u32, total_steps: u32) -> f64 {
    if total_steps == 0 {
        return 0.0;
    }
    (f64::from(current_step) / f64::from(total_steps) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSet, AnswerValue, StepRange};
    use crate::planner::compute_milestones;

    fn milestones() -> Vec<Milestone> {
        vec![
            Milestone::new(MilestoneKey::Profile, StepRange::new(1, 2)),
            Milestone::new(MilestoneKey::Destination, StepRange::new(3, 6)),
            Milestone::new(MilestoneKey::Finalization, StepRange::new(7, 100)),
        ]
    }

    #[test]
    fn first_matching_range_wins() {
        let position = locate(&milestones(), 4).unwrap();
        assert_eq!(position.index, 1);
        assert_eq!(position.key, MilestoneKey::Destination);
        assert!((position.phase_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn range_ends_are_inclusive() {
        let list = milestones();
        assert_eq!(locate(&list, 1).unwrap().index, 0);
        let end_of_profile = locate(&list, 2).unwrap();
        assert_eq!(end_of_profile.index, 0);
        assert!((end_of_profile.phase_percent - 100.0).abs() < f64::EPSILON);
        assert_eq!(locate(&list, 3).unwrap().index, 1);
    }

    #[test]
    fn out_of_range_falls_back_to_last_milestone() {
        let list = milestones();

        let beyond = locate(&list, 250).unwrap();
        assert_eq!(beyond.key, MilestoneKey::Finalization);
        assert!((beyond.phase_percent - 100.0).abs() < f64::EPSILON);

        let before = locate(&list, 0).unwrap();
        assert_eq!(before.index, 2);
        assert!(before.phase_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn empty_list_has_no_position() {
        assert!(locate(&[], 3).is_none());
    }

    #[test]
    fn inverted_range_reads_as_complete() {
        let list = vec![Milestone::new(MilestoneKey::Finalization, StepRange::new(9, 8))];
        let pos = locate(&list, 9).unwrap();
        assert_eq!(pos.index, 0);
        assert!((pos.phase_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn locates_within_planned_milestones() {
        let answers = AnswerSet::new()
            .with("travelGroup", "family")
            .with("helpWith", AnswerValue::list(["flights"]));
        let milestones = compute_milestones(&answers);

        let position = locate(&milestones, 8).unwrap();
        assert_eq!(position.key, MilestoneKey::Flights);
        assert!((position.phase_percent - 100.0).abs() < f64::EPSILON);

        let finalization = locate(&milestones, 9).unwrap();
        assert_eq!(finalization.key, MilestoneKey::Finalization);
        assert!(finalization.phase_percent > 0.0 && finalization.phase_percent < 2.0);
    }

    #[test]
    fn overall_percent_is_clamped() {
        assert!((overall_percent(5, 10) - 50.0).abs() < f64::EPSILON);
        assert!((overall_percent(12, 10) - 100.0).abs() < f64::EPSILON);
        assert!(overall_percent(3, 0).abs() < f64::EPSILON);
    }
}
