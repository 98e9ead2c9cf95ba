mod answers;
mod draft;
mod ids;
mod milestone;
mod question;
pub mod trip;

pub use answers::{AnswerSet, AnswerValue, ChildAge};
pub use ids::{DraftId, ParseIdError, SubmissionId};

pub use draft::{DraftError, QuestionnaireDraft, Submission, SubmissionError};
pub use milestone::{FINALIZATION_END, Milestone, MilestoneKey, StepRange};
pub use question::{PlannedQuestion, QuestionKey, UnknownQuestionKey};
pub use trip::{BudgetKind, DatesKind, DestinationStatus, HelpWith, Service, TravelGroup, TripAnswers};
