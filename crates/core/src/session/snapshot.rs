use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{Question, QuestionId, Rating, TopicId};
use crate::session::quiz::{
    AnswerRecord, QuizSession, SessionPolicy, SessionStateError, SessionStatus, ensure_unique_ids,
};
use crate::session::timer::QuestionTimer;
use crate::session::violations::ViolationTracker;

/// Serialized shape of an in-progress (or just finished) quiz.
///
/// Deserializing into `QuizSession` re-validates every invariant, so a
/// hand-edited or truncated snapshot fails to load instead of producing a
/// session that could move backwards or score inconsistently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub topic_id: TopicId,
    pub rating: Rating,
    pub questions: Vec<Question>,
    pub current_index: usize,
    #[serde(default)]
    pub answers: HashMap<QuestionId, AnswerRecord>,
    #[serde(default)]
    pub pending_selection: Option<usize>,
    pub remaining_secs: u32,
    #[serde(default)]
    pub violations: u32,
    pub fullscreen: bool,
    pub status: SessionStatus,
    pub policy: SessionPolicy,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizSnapshot {
    /// Whether a snapshot taken at `started_at` may still be resumed at `now`.
    #[must_use]
    pub fn is_resumable(started_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(started_at) <= window
    }
}

fn invalid(msg: impl Into<String>) -> SessionStateError {
    SessionStateError::InvalidSnapshot(msg.into())
}

impl TryFrom<QuizSnapshot> for QuizSession {
    type Error = SessionStateError;

    fn try_from(s: QuizSnapshot) -> Result<Self, Self::Error> {
        let policy = s.policy.validate()?;
        if s.questions.is_empty() {
            return Err(SessionStateError::Empty);
        }
        ensure_unique_ids(&s.questions)?;

        let len = s.questions.len();
        match s.status {
            SessionStatus::Active if s.current_index >= len => {
                return Err(invalid("active session points past the last question"));
            }
            SessionStatus::Completed if s.current_index != len => {
                return Err(invalid("completed session has unanswered questions"));
            }
            SessionStatus::Abandoned if s.current_index > len => {
                return Err(invalid("question index out of range"));
            }
            _ => {}
        }
        if s.status == SessionStatus::Completed && s.completed_at.is_none() {
            return Err(invalid("completed session without completion time"));
        }

        // Exactly the questions before the current index carry answers.
        if s.answers.len() != s.current_index {
            return Err(invalid("answer count does not match question index"));
        }
        for question in &s.questions[..s.current_index] {
            let answer = s
                .answers
                .get(question.id())
                .ok_or_else(|| invalid(format!("missing answer for {}", question.id())))?;
            if let Some(selected) = answer.selected {
                if !question.has_option(selected) {
                    return Err(invalid(format!("answer for {} out of range", question.id())));
                }
            }
        }

        if let Some(pending) = s.pending_selection {
            let in_range = s
                .questions
                .get(s.current_index)
                .is_some_and(|q| q.has_option(pending));
            if !in_range {
                return Err(invalid("pending selection out of range"));
            }
        }

        let timer = QuestionTimer::from_persisted(policy.question_secs, s.remaining_secs)
            .ok_or_else(|| invalid("remaining time exceeds question duration"))?;
        let violations = ViolationTracker::from_persisted(s.violations, policy.violation_limit);
        if s.status == SessionStatus::Active && violations.is_exceeded() {
            return Err(invalid("active session already exceeded its violation limit"));
        }

        Ok(QuizSession {
            topic_id: s.topic_id,
            rating: s.rating,
            questions: s.questions,
            current: s.current_index,
            answers: s.answers,
            pending: s.pending_selection,
            timer,
            violations,
            fullscreen: s.fullscreen,
            status: s.status,
            policy,
            started_at: s.started_at,
            completed_at: s.completed_at,
        })
    }
}

impl From<QuizSession> for QuizSnapshot {
    fn from(session: QuizSession) -> Self {
        Self {
            topic_id: session.topic_id,
            rating: session.rating,
            questions: session.questions,
            current_index: session.current,
            answers: session.answers,
            pending_selection: session.pending,
            remaining_secs: session.timer.remaining_secs(),
            violations: session.violations.count(),
            fullscreen: session.fullscreen,
            status: session.status,
            policy: session.policy,
            started_at: session.started_at,
            completed_at: session.completed_at,
        }
    }
}
