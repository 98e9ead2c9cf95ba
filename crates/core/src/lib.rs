#![forbid(unsafe_code)]

pub mod model;
pub mod planner;
pub mod progress;
pub mod time;

pub use planner::{QuestionPlan, compute_milestones, plan_questions};
pub use progress::{MilestonePosition, locate, overall_percent};
pub use time::Clock;
