mod progress;
mod session;
mod workflow;

// Public API of the questionnaire subsystem.
pub use crate::error::QuestionnaireError;
pub use progress::QuestionnaireProgress;
pub use session::QuestionnaireSession;
pub use workflow::{QuestionnaireAnswerResult, QuestionnaireLoopService};
