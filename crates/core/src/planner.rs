//! Milestone planning for the trip questionnaire.
//!
//! The planner walks the fixed phase order once, asks each phase which of its
//! questions apply to the current answers, and numbers those questions with a
//! running step cursor. Milestones are the step ranges each phase ended up
//! covering. Nothing is stored: the plan is recomputed from the answer set on
//! every change.

use serde::Serialize;

use crate::model::{
    AnswerSet, FINALIZATION_END, Milestone, MilestoneKey, PlannedQuestion, QuestionKey, Service,
    StepRange, TripAnswers,
};

/// Ordered question sequence and the milestones derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionPlan {
    questions: Vec<PlannedQuestion>,
    milestones: Vec<Milestone>,
}

impl QuestionPlan {
    #[must_use]
    pub fn questions(&self) -> &[PlannedQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    #[must_use]
    pub fn into_milestones(self) -> Vec<Milestone> {
        self.milestones
    }

    /// Step of the closing review screen, right after the last question.
    #[must_use]
    pub fn finalization_step(&self) -> u32 {
        u32::try_from(self.questions.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }

    /// Total number of steps, including the finalization step.
    #[must_use]
    pub fn total_steps(&self) -> u32 {
        self.finalization_step()
    }

    /// Question asked at `step`, or `None` for the finalization step and beyond.
    #[must_use]
    pub fn question_at(&self, step: u32) -> Option<&PlannedQuestion> {
        let index = usize::try_from(step.checked_sub(1)?).ok()?;
        self.questions.get(index)
    }

    /// Step at which `key` is asked, if it is part of this plan.
    #[must_use]
    pub fn step_of(&self, key: QuestionKey) -> Option<u32> {
        self.questions.iter().find(|q| q.key == key).map(|q| q.step)
    }
}

/// Computes the ordered milestone list for an answer snapshot.
#[must_use]
pub fn compute_milestones(answers: &AnswerSet) -> Vec<Milestone> {
    plan_questions(answers).into_milestones()
}

/// Computes the full question sequence for an answer snapshot.
#[must_use]
pub fn plan_questions(answers: &AnswerSet) -> QuestionPlan {
    let trip = TripAnswers::from_answers(answers);
    let mut builder = PlanBuilder::default();

    builder.phase(MilestoneKey::Profile, profile_questions(&trip));
    builder.phase(MilestoneKey::Destination, destination_questions(&trip));
    builder.phase(MilestoneKey::Dates, dates_questions(&trip));
    builder.phase(MilestoneKey::Budget, budget_questions(&trip));

    if trip.help_with.contains(Service::Flights) {
        builder.phase(
            MilestoneKey::Flights,
            vec![QuestionKey::DepartureCity, QuestionKey::FlightPreferences],
        );
    }

    // Mobility is asked inside activities when activities were requested,
    // otherwise as a phase of its own.
    if trip.help_with.contains(Service::Activities) {
        builder.phase(MilestoneKey::Activities, activities_questions(&trip));
    } else if trip.wants_mobility() {
        builder.phase(MilestoneKey::Mobility, vec![QuestionKey::Mobility]);
    }

    if trip.help_with.contains(Service::Accommodation) {
        builder.phase(
            MilestoneKey::Accommodation,
            vec![
                QuestionKey::AccommodationType,
                QuestionKey::AccommodationComfort,
            ],
        );
    }

    builder.finish()
}

fn profile_questions(trip: &TripAnswers) -> Vec<QuestionKey> {
    let mut questions = vec![QuestionKey::TravelGroup];
    if trip.is_family() {
        questions.push(QuestionKey::Children);
    }
    questions.push(QuestionKey::HelpWith);
    questions
}

fn destination_questions(trip: &TripAnswers) -> Vec<QuestionKey> {
    let mut questions = vec![QuestionKey::HasDestination];
    if trip.destination_known() {
        questions.push(QuestionKey::Destination);
    } else if trip.destination_unknown() {
        questions.extend([
            QuestionKey::Climate,
            QuestionKey::Affinities,
            QuestionKey::Ambiance,
        ]);
    }
    questions
}

fn dates_questions(trip: &TripAnswers) -> Vec<QuestionKey> {
    use crate::model::DatesKind;

    let mut questions = vec![QuestionKey::DatesType];
    match trip.dates {
        Some(DatesKind::Fixed) => questions.push(QuestionKey::ExactDates),
        Some(DatesKind::Flexible) => {
            questions.extend([QuestionKey::FlexibleMonth, QuestionKey::TripDuration]);
        }
        None => {}
    }
    questions
}

fn budget_questions(trip: &TripAnswers) -> Vec<QuestionKey> {
    use crate::model::BudgetKind;

    let mut questions = vec![QuestionKey::Budget];
    if trip.budget == Some(BudgetKind::Custom) {
        questions.push(QuestionKey::BudgetAmount);
    }
    questions
}

fn activities_questions(trip: &TripAnswers) -> Vec<QuestionKey> {
    let mut questions = vec![QuestionKey::ActivityTypes];
    if trip.destination_known() {
        questions.push(QuestionKey::TravelStyle);
    }
    if trip.wants_mobility() {
        questions.push(QuestionKey::Mobility);
    }
    questions
}

/// Running step cursor shared by all phases of one planning pass.
struct PlanBuilder {
    cursor: u32,
    questions: Vec<PlannedQuestion>,
    milestones: Vec<Milestone>,
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self {
            cursor: 1,
            questions: Vec::new(),
            milestones: Vec::new(),
        }
    }
}

impl PlanBuilder {
    fn phase(&mut self, milestone: MilestoneKey, questions: Vec<QuestionKey>) {
        if questions.is_empty() {
            return;
        }
        let start = self.cursor;
        for key in questions {
            self.questions.push(PlannedQuestion {
                step: self.cursor,
                key,
                milestone,
            });
            self.cursor += 1;
        }
        self.milestones
            .push(Milestone::new(milestone, StepRange::new(start, self.cursor - 1)));
    }

    fn finish(mut self) -> QuestionPlan {
        self.milestones.push(Milestone::new(
            MilestoneKey::Finalization,
            StepRange::new(self.cursor, FINALIZATION_END),
        ));
        QuestionPlan {
            questions: self.questions,
            milestones: self.milestones,
        }
    }
}
