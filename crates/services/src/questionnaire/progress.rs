use serde::Serialize;
use trip_core::model::MilestoneKey;

/// Aggregated view of questionnaire progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionnaireProgress {
    pub current_step: u32,
    pub total_steps: u32,
    pub overall_percent: f64,
    pub milestone_index: usize,
    pub milestone_key: MilestoneKey,
    pub phase_percent: f64,
    pub is_at_finalization: bool,
}
