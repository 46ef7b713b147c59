pub mod quiz;
pub mod quiz_question;
pub mod session_state;
pub use quiz::{Quiz, QuizMetadata, QuizSummary};
pub use quiz_question::Question;
pub use session_state::{SessionPhase, SessionState};
