use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Duration;

use quiz_core::Clock;
use quiz_core::model::{Rating, ResultRecord, TopicId};
use quiz_core::session::{
    QuizSession, QuizSnapshot, SessionPolicy, SessionStatus, Transition, ViolationKind,
};
use storage::SessionStore;

use crate::api::QuizApi;
use crate::error::QuizFlowError;

/// Input the quiz reacts to, from the countdown or the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    Tick(u32),
    Select(usize),
    Submit,
    Skip,
    Violation(ViolationKind),
    FullscreenEntered,
    Quit,
}

/// How a quiz came to be active.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizStart {
    Resumed(QuizSession),
    Fresh(QuizSession),
}

impl QuizStart {
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        matches!(self, QuizStart::Resumed(_))
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        match self {
            QuizStart::Resumed(s) | QuizStart::Fresh(s) => s,
        }
    }

    #[must_use]
    pub fn into_session(self) -> QuizSession {
        match self {
            QuizStart::Resumed(s) | QuizStart::Fresh(s) => s,
        }
    }
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowStep {
    pub transition: Transition,
    pub result: Option<ResultRecord>,
}

/// Starts, resumes and persists quiz sessions.
#[derive(Clone)]
pub struct QuizFlowService {
    clock: Clock,
    api: Arc<dyn QuizApi>,
    store: SessionStore,
    policy: SessionPolicy,
    resume_window: Duration,
    loading: Arc<AtomicBool>,
}

impl QuizFlowService {
    #[must_use]
    pub fn new(
        clock: Clock,
        api: Arc<dyn QuizApi>,
        store: SessionStore,
        policy: SessionPolicy,
        resume_window: Duration,
    ) -> Self {
        Self {
            clock,
            api,
            store,
            policy,
            resume_window,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Resume the stored quiz for `topic`/`rating`, or fetch questions and
    /// start a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `GuidelinesNotAccepted` before onboarding, `AlreadyLoading`
    /// while another fetch for this service is in flight, and API, state or
    /// storage errors otherwise. Fetch failures are not retried.
    pub async fn begin(&self, topic: TopicId, rating: Rating) -> Result<QuizStart, QuizFlowError> {
        if !self.store.guidelines_accepted().await? {
            return Err(QuizFlowError::GuidelinesNotAccepted);
        }

        if let Some(session) = self.resume_existing().await? {
            if session.topic_id() == &topic && session.rating() == rating {
                tracing::info!(
                    topic = %topic,
                    index = session.current_index(),
                    remaining_secs = session.remaining_secs(),
                    "resuming quiz"
                );
                return Ok(QuizStart::Resumed(session));
            }
            tracing::debug!(stored = %session.topic_id(), "discarding snapshot for another quiz");
            self.store.clear_quiz().await?;
        }

        let _guard = LoadGuard::acquire(&self.loading).ok_or(QuizFlowError::AlreadyLoading)?;
        let questions = self.api.fetch_questions(&topic, rating).await?;
        let session = QuizSession::start(topic, rating, questions, self.policy, self.clock.now())?;
        self.store.save_quiz(&session).await?;
        tracing::info!(
            topic = %session.topic_id(),
            rating = %session.rating(),
            questions = session.total_questions(),
            "quiz started"
        );
        Ok(QuizStart::Fresh(session))
    }

    /// The stored active session, if it is still inside the resume window.
    ///
    /// Stale or finished snapshots are deleted.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` if the store fails.
    pub async fn resume_existing(&self) -> Result<Option<QuizSession>, QuizFlowError> {
        let Some(session) = self.store.load_quiz().await? else {
            return Ok(None);
        };
        let fresh = QuizSnapshot::is_resumable(
            session.started_at(),
            self.clock.now(),
            self.resume_window,
        );
        if session.is_active() && fresh {
            return Ok(Some(session));
        }
        tracing::debug!(
            status = ?session.status(),
            started_at = %session.started_at(),
            "discarding stale quiz snapshot"
        );
        self.store.clear_quiz().await?;
        Ok(None)
    }

    /// Apply one event and persist the outcome.
    ///
    /// Active sessions are snapshotted after every event. Completion stores
    /// the result and drops the snapshot; abandonment drops the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::State` if the event is invalid for the session
    /// and `QuizFlowError::Storage` if persisting fails.
    pub async fn apply(
        &self,
        session: &mut QuizSession,
        event: QuizEvent,
    ) -> Result<FlowStep, QuizFlowError> {
        let now = self.clock.now();
        let transition = match event {
            QuizEvent::Tick(secs) => session.tick(secs, now)?,
            QuizEvent::Select(index) => {
                session.select(index)?;
                Transition::Stayed
            }
            QuizEvent::Submit => session.submit(now)?,
            QuizEvent::Skip => session.skip(now)?,
            QuizEvent::Violation(kind) => {
                let transition = session.record_violation(kind)?;
                tracing::info!(
                    %kind,
                    count = session.violations().count(),
                    limit = session.violations().limit(),
                    "quiz violation"
                );
                transition
            }
            QuizEvent::FullscreenEntered => {
                session.fullscreen_entered()?;
                Transition::Stayed
            }
            QuizEvent::Quit => session.abandon()?,
        };

        let result = match session.status() {
            SessionStatus::Active => {
                self.store.save_quiz(session).await?;
                None
            }
            SessionStatus::Completed => {
                let record = session.result(now)?;
                self.store.save_results(&record).await?;
                self.store.clear_quiz().await?;
                tracing::info!(score = record.score(), total = record.total(), "quiz completed");
                Some(record)
            }
            SessionStatus::Abandoned => {
                self.store.clear_quiz().await?;
                tracing::info!(index = session.current_index(), "quiz abandoned");
                None
            }
        };

        Ok(FlowStep { transition, result })
    }

    /// Persist the session as-is, e.g. when the front end goes away.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` if the write fails.
    pub async fn suspend(&self, session: &QuizSession) -> Result<(), QuizFlowError> {
        if session.is_active() {
            self.store.save_quiz(session).await?;
        }
        Ok(())
    }
}

/// Holds the loading flag for the duration of one fetch cycle.
struct LoadGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
