use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::model::{Question, QuestionId, Rating, ResultDetail, ResultError, ResultRecord, TopicId};
use crate::session::snapshot::QuizSnapshot;
use crate::session::timer::{QuestionTimer, TimerStatus};
use crate::session::violations::{ViolationKind, ViolationTracker};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("no questions available for this quiz")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    #[error("invalid session policy: {0}")]
    InvalidPolicy(&'static str),

    #[error("session is {0}, not active")]
    NotActive(SessionStatus),

    #[error("option {index} does not exist (question has {options} options)")]
    OptionOutOfRange { index: usize, options: usize },

    #[error("no option selected")]
    NoSelection,

    #[error("session has not completed")]
    NotCompleted,

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error(transparent)]
    Result(#[from] ResultError),
}

//
// ─── POLICY / STATUS ──────────────────────────────────────────────────────────
//

/// Tunables that travel with a session so a resumed quiz keeps its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPolicy {
    pub question_secs: u32,
    pub violation_limit: u32,
}

impl SessionPolicy {
    pub const DEFAULT_QUESTION_SECS: u32 = 60;
    pub const DEFAULT_VIOLATION_LIMIT: u32 = 3;

    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidPolicy` if either value is zero.
    pub fn validate(self) -> Result<Self, SessionStateError> {
        if self.question_secs == 0 {
            return Err(SessionStateError::InvalidPolicy("question_secs must be > 0"));
        }
        if self.violation_limit == 0 {
            return Err(SessionStateError::InvalidPolicy("violation_limit must be > 0"));
        }
        Ok(self)
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            question_secs: Self::DEFAULT_QUESTION_SECS,
            violation_limit: Self::DEFAULT_VIOLATION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => f.write_str("active"),
            SessionStatus::Completed => f.write_str("completed"),
            SessionStatus::Abandoned => f.write_str("abandoned"),
        }
    }
}

/// How a question was left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Submitted,
    Skipped,
    TimedOut,
}

/// Final answer recorded for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub selected: Option<usize>,
    pub outcome: AnswerOutcome,
    pub elapsed_secs: u32,
}

/// Effect of feeding an event to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed (or not) without leaving the current question.
    Stayed,
    /// Moved on to the question at `index`.
    Advanced { index: usize },
    Completed,
    Abandoned,
}

impl Transition {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Transition::Completed | Transition::Abandoned)
    }

    #[must_use]
    pub fn changes_question(self) -> bool {
        !matches!(self, Transition::Stayed)
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// One timed quiz attempt.
///
/// The question index only moves forward. Every question is left exactly once,
/// by submission, skip or timer expiry, and each of those resets the timer for
/// the next question.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizSnapshot", into = "QuizSnapshot")]
pub struct QuizSession {
    pub(super) topic_id: TopicId,
    pub(super) rating: Rating,
    pub(super) questions: Vec<Question>,
    pub(super) current: usize,
    pub(super) answers: HashMap<QuestionId, AnswerRecord>,
    pub(super) pending: Option<usize>,
    pub(super) timer: QuestionTimer,
    pub(super) violations: ViolationTracker,
    pub(super) fullscreen: bool,
    pub(super) status: SessionStatus,
    pub(super) policy: SessionPolicy,
    pub(super) started_at: DateTime<Utc>,
    pub(super) completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session on the first question with a fresh timer.
    ///
    /// The session starts in fullscreen presentation.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Empty` for an empty question list,
    /// `DuplicateQuestion` if two questions share an id and `InvalidPolicy`
    /// for a zero timer or violation limit.
    pub fn start(
        topic_id: TopicId,
        rating: Rating,
        questions: Vec<Question>,
        policy: SessionPolicy,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionStateError> {
        let policy = policy.validate()?;
        if questions.is_empty() {
            return Err(SessionStateError::Empty);
        }
        ensure_unique_ids(&questions)?;

        Ok(Self {
            topic_id,
            rating,
            questions,
            current: 0,
            answers: HashMap::new(),
            pending: None,
            timer: QuestionTimer::new(policy.question_secs),
            violations: ViolationTracker::new(policy.violation_limit),
            fullscreen: true,
            status: SessionStatus::Active,
            policy,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn rating(&self) -> Rating {
        self.rating
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Index of the active question; equals the question count once completed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.status {
            SessionStatus::Active => self.questions.get(self.current),
            SessionStatus::Completed | SessionStatus::Abandoned => None,
        }
    }

    #[must_use]
    pub fn pending_selection(&self) -> Option<usize> {
        self.pending
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.timer.remaining_secs()
    }

    #[must_use]
    pub fn timer(&self) -> QuestionTimer {
        self.timer
    }

    #[must_use]
    pub fn violations(&self) -> ViolationTracker {
        self.violations
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    #[must_use]
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn answer_for(&self, id: &QuestionId) -> Option<&AnswerRecord> {
        self.answers.get(id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    //
    // ─── TRANSITIONS ──────────────────────────────────────────────────────────
    //

    /// Mark an option of the current question as selected (not yet final).
    ///
    /// # Errors
    ///
    /// Returns `NotActive` for finished sessions and `OptionOutOfRange` for an
    /// index the question does not have.
    pub fn select(&mut self, index: usize) -> Result<(), SessionStateError> {
        let question = self.active_question()?;
        if !question.has_option(index) {
            return Err(SessionStateError::OptionOutOfRange {
                index,
                options: question.options().len(),
            });
        }
        self.pending = Some(index);
        Ok(())
    }

    /// Submit the pending selection as the final answer and advance.
    ///
    /// # Errors
    ///
    /// Returns `NotActive` for finished sessions and `NoSelection` if nothing
    /// has been selected.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<Transition, SessionStateError> {
        self.active_question()?;
        if self.pending.is_none() {
            return Err(SessionStateError::NoSelection);
        }
        Ok(self.advance(AnswerOutcome::Submitted, now))
    }

    /// Leave the current question unanswered and advance.
    ///
    /// # Errors
    ///
    /// Returns `NotActive` for finished sessions.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Result<Transition, SessionStateError> {
        self.active_question()?;
        self.pending = None;
        Ok(self.advance(AnswerOutcome::Skipped, now))
    }

    /// Count down the question timer. On expiry the pending selection (if any)
    /// becomes the final answer and the session advances.
    ///
    /// # Errors
    ///
    /// Returns `NotActive` for finished sessions.
    pub fn tick(&mut self, secs: u32, now: DateTime<Utc>) -> Result<Transition, SessionStateError> {
        self.active_question()?;
        match self.timer.tick(secs) {
            TimerStatus::Running { .. } => Ok(Transition::Stayed),
            TimerStatus::Expired => Ok(self.advance(AnswerOutcome::TimedOut, now)),
        }
    }

    /// Record a focus-loss or fullscreen-exit violation.
    ///
    /// A fullscreen exit while already out of fullscreen is not counted again.
    /// Reaching the policy limit abandons the session.
    ///
    /// # Errors
    ///
    /// Returns `NotActive` for finished sessions.
    pub fn record_violation(
        &mut self,
        kind: ViolationKind,
    ) -> Result<Transition, SessionStateError> {
        self.active_question()?;
        if kind == ViolationKind::FullscreenExited {
            if !self.fullscreen {
                return Ok(Transition::Stayed);
            }
            self.fullscreen = false;
        }

        self.violations.record();
        if self.violations.is_exceeded() {
            self.status = SessionStatus::Abandoned;
            self.pending = None;
            return Ok(Transition::Abandoned);
        }
        Ok(Transition::Stayed)
    }

    /// Fullscreen presentation was (re-)entered.
    ///
    /// # Errors
    ///
    /// Returns `NotActive` for finished sessions.
    pub fn fullscreen_entered(&mut self) -> Result<(), SessionStateError> {
        self.active_question()?;
        self.fullscreen = true;
        Ok(())
    }

    /// Give up on the quiz. No result is produced.
    ///
    /// # Errors
    ///
    /// Returns `NotActive` for finished sessions.
    pub fn abandon(&mut self) -> Result<Transition, SessionStateError> {
        self.active_question()?;
        self.status = SessionStatus::Abandoned;
        self.pending = None;
        Ok(Transition::Abandoned)
    }

    /// Score a completed session.
    ///
    /// # Errors
    ///
    /// Returns `NotCompleted` unless every question has been left behind.
    pub fn result(&self, created_at: DateTime<Utc>) -> Result<ResultRecord, SessionStateError> {
        if self.status != SessionStatus::Completed {
            return Err(SessionStateError::NotCompleted);
        }
        let details = self
            .questions
            .iter()
            .map(|question| ResultDetail {
                question: question.clone(),
                selected: self.answers.get(question.id()).and_then(|a| a.selected),
            })
            .collect();

        Ok(ResultRecord::from_details(
            self.topic_id.clone(),
            self.rating,
            details,
            created_at,
        )?)
    }

    fn active_question(&self) -> Result<&Question, SessionStateError> {
        if self.status != SessionStatus::Active {
            return Err(SessionStateError::NotActive(self.status));
        }
        self.questions
            .get(self.current)
            .ok_or(SessionStateError::NotActive(self.status))
    }

    fn advance(&mut self, outcome: AnswerOutcome, now: DateTime<Utc>) -> Transition {
        let Some(question) = self.questions.get(self.current) else {
            return Transition::Stayed;
        };
        self.answers.insert(
            question.id().clone(),
            AnswerRecord {
                selected: self.pending.take(),
                outcome,
                elapsed_secs: self.timer.elapsed_secs(),
            },
        );

        self.current += 1;
        self.timer.reset();

        if self.current >= self.questions.len() {
            self.status = SessionStatus::Completed;
            self.completed_at = Some(now);
            Transition::Completed
        } else {
            Transition::Advanced {
                index: self.current,
            }
        }
    }
}

pub(super) fn ensure_unique_ids(questions: &[Question]) -> Result<(), SessionStateError> {
    let mut seen = HashSet::with_capacity(questions.len());
    for question in questions {
        if !seen.insert(question.id()) {
            return Err(SessionStateError::DuplicateQuestion(question.id().clone()));
        }
    }
    Ok(())
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("topic_id", &self.topic_id)
            .field("rating", &self.rating)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("remaining_secs", &self.timer.remaining_secs())
            .field("violations", &self.violations.count())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn build_questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    QuestionId::new(format!("q{}", i + 1)).unwrap(),
                    format!("What is ${i} + 1$?"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    i % 4,
                    Difficulty::Medium,
                    format!("Explanation {i}"),
                )
                .unwrap()
            })
            .collect()
    }

    fn start(n: usize) -> QuizSession {
        QuizSession::start(
            TopicId::new("profit-loss").unwrap(),
            Rating::new(3).unwrap(),
            build_questions(n),
            SessionPolicy::default(),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = QuizSession::start(
            TopicId::new("profit-loss").unwrap(),
            Rating::new(3).unwrap(),
            Vec::new(),
            SessionPolicy::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionStateError::Empty);
    }

    #[test]
    fn duplicate_question_ids_are_rejected() {
        let mut questions = build_questions(2);
        questions.push(questions[0].clone());
        let err = QuizSession::start(
            TopicId::new("ratios").unwrap(),
            Rating::new(1).unwrap(),
            questions,
            SessionPolicy::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionStateError::DuplicateQuestion(_)));
    }

    #[test]
    fn starts_on_first_question_in_fullscreen() {
        let session = start(6);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.remaining_secs(), 60);
        assert!(session.is_fullscreen());
        assert!(session.is_active());
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let mut session = start(6);
        let now = fixed_now();
        for _ in 0..6 {
            let correct = session.current_question().unwrap().correct();
            session.select(correct).unwrap();
            session.tick(10, now).unwrap();
            session.submit(now).unwrap();
        }
        assert_eq!(session.status(), SessionStatus::Completed);

        let result = session.result(now).unwrap();
        assert_eq!(result.score(), 6);
        assert_eq!(result.total(), 6);
        assert!(result.details().iter().all(ResultDetail::is_correct));
    }

    #[test]
    fn timeout_without_selection_records_none_and_advances() {
        let mut session = start(6);
        let now = fixed_now();

        let correct = session.current_question().unwrap().correct();
        session.select(correct).unwrap();
        assert_eq!(session.submit(now).unwrap(), Transition::Advanced { index: 1 });

        for _ in 0..59 {
            assert_eq!(session.tick(1, now).unwrap(), Transition::Stayed);
        }
        assert_eq!(session.tick(1, now).unwrap(), Transition::Advanced { index: 2 });

        let q2 = session.questions()[1].id().clone();
        let answer = session.answer_for(&q2).unwrap();
        assert_eq!(answer.selected, None);
        assert_eq!(answer.outcome, AnswerOutcome::TimedOut);
        assert_eq!(answer.elapsed_secs, 60);
        assert_eq!(session.remaining_secs(), 60);

        while session.is_active() {
            session.skip(now).unwrap();
        }
        let result = session.result(now).unwrap();
        assert_eq!(result.details()[1].selected, None);
        assert!(!result.details()[1].is_correct());
    }

    #[test]
    fn timeout_keeps_pending_selection() {
        let mut session = start(2);
        session.select(2).unwrap();
        session.tick(60, fixed_now()).unwrap();
        let q1 = session.questions()[0].id().clone();
        assert_eq!(session.answer_for(&q1).unwrap().selected, Some(2));
    }

    #[test]
    fn submit_requires_a_selection() {
        let mut session = start(2);
        assert_eq!(
            session.submit(fixed_now()).unwrap_err(),
            SessionStateError::NoSelection
        );
        assert_eq!(
            session.select(9).unwrap_err(),
            SessionStateError::OptionOutOfRange {
                index: 9,
                options: 4
            }
        );
    }

    #[test]
    fn violations_on_question_four_abandon_without_result() {
        let mut session = start(6);
        let now = fixed_now();
        for _ in 0..3 {
            session.skip(now).unwrap();
        }
        assert_eq!(session.current_index(), 3);

        assert_eq!(
            session.record_violation(ViolationKind::FocusLost).unwrap(),
            Transition::Stayed
        );
        assert_eq!(
            session.record_violation(ViolationKind::FullscreenExited).unwrap(),
            Transition::Stayed
        );
        assert_eq!(
            session.record_violation(ViolationKind::FocusLost).unwrap(),
            Transition::Abandoned
        );
        assert_eq!(session.status(), SessionStatus::Abandoned);
        assert_eq!(
            session.result(now).unwrap_err(),
            SessionStateError::NotCompleted
        );
        assert!(matches!(
            session.skip(now).unwrap_err(),
            SessionStateError::NotActive(SessionStatus::Abandoned)
        ));
    }

    #[test]
    fn repeated_fullscreen_exit_counts_once() {
        let mut session = start(2);
        session.record_violation(ViolationKind::FullscreenExited).unwrap();
        session.record_violation(ViolationKind::FullscreenExited).unwrap();
        assert_eq!(session.violations().count(), 1);
        assert!(!session.is_fullscreen());

        session.fullscreen_entered().unwrap();
        session.record_violation(ViolationKind::FullscreenExited).unwrap();
        assert_eq!(session.violations().count(), 2);
    }

    #[test]
    fn completion_timestamp_is_recorded() {
        let mut session = start(1);
        let later = fixed_now() + Duration::minutes(1);
        assert_eq!(session.skip(later).unwrap(), Transition::Completed);
        assert_eq!(session.completed_at(), Some(later));
        assert!(session.current_question().is_none());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Event {
            Select(usize),
            Submit,
            Skip,
            Tick(u32),
            Violation(bool),
            Fullscreen,
        }

        fn event() -> impl Strategy<Value = Event> {
            prop_oneof![
                (0_usize..5).prop_map(Event::Select),
                Just(Event::Submit),
                Just(Event::Skip),
                (1_u32..90).prop_map(Event::Tick),
                any::<bool>().prop_map(Event::Violation),
                Just(Event::Fullscreen),
            ]
        }

        proptest! {
            #[test]
            fn index_never_decreases(events in proptest::collection::vec(event(), 0..80)) {
                let mut session = start(6);
                let now = fixed_now();
                let mut last = session.current_index();
                for event in events {
                    let _ = match event {
                        Event::Select(i) => session.select(i).map(|()| Transition::Stayed),
                        Event::Submit => session.submit(now),
                        Event::Skip => session.skip(now),
                        Event::Tick(s) => session.tick(s, now),
                        Event::Violation(focus) => session.record_violation(if focus {
                            ViolationKind::FocusLost
                        } else {
                            ViolationKind::FullscreenExited
                        }),
                        Event::Fullscreen => session.fullscreen_entered().map(|()| Transition::Stayed),
                    };
                    prop_assert!(session.current_index() >= last);
                    last = session.current_index();
                }

                if let Ok(result) = session.result(now) {
                    let correct = result.details().iter().filter(|d| d.selected == Some(d.correct())).count();
                    prop_assert_eq!(result.total() as usize, result.details().len());
                    prop_assert_eq!(result.score() as usize, correct);
                }
            }
        }
    }
}
