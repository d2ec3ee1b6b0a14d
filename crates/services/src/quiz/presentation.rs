use quiz_core::session::{QuizSession, SessionStateError, ViolationKind, ViolationTracker};

/// Front-end hooks driven by `QuizRunner`. All methods default to no-ops.
pub trait Presentation {
    fn enter_fullscreen(&mut self) {}

    fn exit_fullscreen(&mut self) {}

    /// A new question is current, or the pending selection changed.
    fn show_question(&mut self, _session: &QuizSession) {}

    fn show_tick(&mut self, _remaining_secs: u32) {}

    fn show_violation(&mut self, _kind: ViolationKind, _violations: ViolationTracker) {}

    /// An input was not valid in the current state (e.g. submit without a
    /// selection). The session is unchanged.
    fn show_rejected(&mut self, _error: &SessionStateError) {}
}

/// Presentation that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Presentation for Headless {}
