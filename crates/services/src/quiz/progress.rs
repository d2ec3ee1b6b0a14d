use quiz_core::session::QuizSession;

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub remaining_secs: u32,
    pub violations: u32,
    pub violation_limit: u32,
    pub is_complete: bool,
}

impl QuizProgress {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let total = session.total_questions();
        let answered = session.answered_count();
        let violations = session.violations();
        Self {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            remaining_secs: session.remaining_secs(),
            violations: violations.count(),
            violation_limit: violations.limit(),
            is_complete: !session.is_active(),
        }
    }

    /// One-based position of the current question, clamped to `total`.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.answered + 1).min(self.total)
    }
}
