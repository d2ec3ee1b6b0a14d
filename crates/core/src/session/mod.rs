mod quiz;
mod snapshot;
mod timer;
mod violations;

pub use quiz::{
    AnswerOutcome, AnswerRecord, QuizSession, SessionPolicy, SessionStateError, SessionStatus,
    Transition,
};
pub use snapshot::QuizSnapshot;
pub use timer::{QuestionTimer, TimerStatus};
pub use violations::{ViolationKind, ViolationTracker};
