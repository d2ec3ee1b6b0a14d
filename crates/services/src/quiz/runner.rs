use tokio::sync::mpsc;

use quiz_core::model::ResultRecord;
use quiz_core::session::{QuizSession, SessionStateError, Transition, ViolationKind};

use crate::error::QuizFlowError;
use crate::quiz::countdown::Countdown;
use crate::quiz::flow::{QuizEvent, QuizFlowService};
use crate::quiz::presentation::Presentation;

/// How a run of the quiz loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizOutcome {
    Completed(ResultRecord),
    Abandoned { violations: u32 },
    /// The input side went away; the snapshot stays stored for resume.
    Closed,
}

/// Drives one session from input events and the countdown until it ends.
pub struct QuizRunner<P> {
    flow: QuizFlowService,
    presentation: P,
}

impl<P: Presentation> QuizRunner<P> {
    #[must_use]
    pub fn new(flow: QuizFlowService, presentation: P) -> Self {
        Self { flow, presentation }
    }

    #[must_use]
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    #[must_use]
    pub fn into_presentation(self) -> P {
        self.presentation
    }

    /// Run the event loop. Input is handled before pending ticks, one event
    /// at a time.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError` if persisting a transition fails. Inputs the
    /// session rejects are reported to the presentation and ignored.
    pub async fn run(
        &mut self,
        mut session: QuizSession,
        mut input: mpsc::Receiver<QuizEvent>,
    ) -> Result<QuizOutcome, QuizFlowError> {
        let mut countdown = Countdown::new();
        if session.is_fullscreen() {
            self.presentation.enter_fullscreen();
        }
        self.presentation.show_question(&session);
        countdown.restart();

        let outcome = loop {
            let event = tokio::select! {
                biased;
                received = input.recv() => match received {
                    Some(event) => event,
                    None => {
                        self.flow.suspend(&session).await?;
                        break QuizOutcome::Closed;
                    }
                },
                Some(secs) = countdown.next_tick() => QuizEvent::Tick(secs),
            };

            let was_fullscreen = session.is_fullscreen();
            let step = match self.flow.apply(&mut session, event).await {
                Ok(step) => step,
                Err(QuizFlowError::State(err)) => {
                    tracing::debug!(error = %err, ?event, "quiz event rejected");
                    self.presentation.show_rejected(&err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            match step.transition {
                Transition::Stayed => self.show_stayed(&session, event, was_fullscreen),
                Transition::Advanced { .. } => {
                    countdown.restart();
                    self.presentation.show_question(&session);
                }
                Transition::Completed => match step.result {
                    Some(record) => break QuizOutcome::Completed(record),
                    None => return Err(SessionStateError::NotCompleted.into()),
                },
                Transition::Abandoned => {
                    break QuizOutcome::Abandoned {
                        violations: session.violations().count(),
                    };
                }
            }
        };

        countdown.stop();
        self.presentation.exit_fullscreen();
        Ok(outcome)
    }

    fn show_stayed(&mut self, session: &QuizSession, event: QuizEvent, was_fullscreen: bool) {
        match event {
            QuizEvent::Tick(_) => self.presentation.show_tick(session.remaining_secs()),
            // A repeated exit while already out of fullscreen is not counted.
            QuizEvent::Violation(ViolationKind::FullscreenExited) if !was_fullscreen => {}
            QuizEvent::Violation(kind) => {
                if was_fullscreen && !session.is_fullscreen() {
                    self.presentation.exit_fullscreen();
                }
                self.presentation.show_violation(kind, session.violations());
            }
            QuizEvent::FullscreenEntered => {
                self.presentation.enter_fullscreen();
                self.presentation.show_question(session);
            }
            QuizEvent::Select(_) => self.presentation.show_question(session),
            QuizEvent::Submit | QuizEvent::Skip | QuizEvent::Quit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use quiz_core::Clock;
    use quiz_core::model::{Rating, TopicId};
    use quiz_core::session::{SessionPolicy, ViolationKind};
    use quiz_core::time::fixed_now;
    use storage::{SessionStore, Storage};

    use crate::quiz::fixtures::{CORRECT, FakeApi, Recording, questions};

    async fn setup(count: usize) -> (QuizFlowService, SessionStore, QuizSession) {
        let store = Storage::in_memory().session_store();
        store.set_guidelines_accepted(true).await.unwrap();
        let flow = QuizFlowService::new(
            Clock::fixed(fixed_now()),
            Arc::new(FakeApi::with_questions(questions(count))),
            store.clone(),
            SessionPolicy::default(),
            ChronoDuration::minutes(60),
        );
        let session = flow
            .begin(TopicId::new("profit-loss").unwrap(), Rating::new(3).unwrap())
            .await
            .unwrap()
            .into_session();
        (flow, store, session)
    }

    fn answer_all(tx: &mpsc::Sender<QuizEvent>, count: usize) {
        for _ in 0..count {
            tx.try_send(QuizEvent::Select(CORRECT)).unwrap();
            tx.try_send(QuizEvent::Submit).unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn all_correct_answers_score_full_marks() {
        let (flow, store, session) = setup(6).await;
        let (tx, rx) = mpsc::channel(32);
        answer_all(&tx, 6);

        let mut runner = QuizRunner::new(flow, Recording::default());
        let outcome = runner.run(session, rx).await.unwrap();

        let QuizOutcome::Completed(record) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!((record.score(), record.total()), (6, 6));
        assert_eq!(runner.presentation().questions_shown, vec![0, 1, 2, 3, 4, 5]);
        assert!(!runner.presentation().fullscreen);
        assert!(store.load_quiz().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_question_times_out_and_advances() {
        let (flow, _, session) = setup(6).await;
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            tx.send(QuizEvent::Select(CORRECT)).await.unwrap();
            tx.send(QuizEvent::Submit).await.unwrap();
            tokio::time::sleep(Duration::from_millis(60_500)).await;
            for _ in 0..4 {
                tx.send(QuizEvent::Select(CORRECT)).await.unwrap();
                tx.send(QuizEvent::Submit).await.unwrap();
            }
        });

        let mut runner = QuizRunner::new(flow, Recording::default());
        let outcome = runner.run(session, rx).await.unwrap();

        let QuizOutcome::Completed(record) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(record.score(), 5);
        assert_eq!(record.details()[1].selected, None);
        assert!(!record.details()[1].is_correct());
        assert_eq!(runner.presentation().questions_shown, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(runner.presentation().ticks, 59);
    }

    #[tokio::test(start_paused = true)]
    async fn violations_on_question_four_abandon_the_quiz() {
        let (flow, store, session) = setup(6).await;
        let (tx, rx) = mpsc::channel(32);
        answer_all(&tx, 3);
        tx.try_send(QuizEvent::Violation(ViolationKind::FocusLost)).unwrap();
        tx.try_send(QuizEvent::Violation(ViolationKind::FullscreenExited)).unwrap();
        tx.try_send(QuizEvent::Violation(ViolationKind::FocusLost)).unwrap();

        let mut runner = QuizRunner::new(flow, Recording::default());
        let outcome = runner.run(session, rx).await.unwrap();

        assert_eq!(outcome, QuizOutcome::Abandoned { violations: 3 });
        assert_eq!(runner.presentation().violations.len(), 2);
        assert!(store.load_quiz().await.unwrap().is_none());
        assert!(
            store
                .load_results(fixed_now(), ChronoDuration::hours(24))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_fullscreen_exits_and_f11_returns() {
        let (flow, store, session) = setup(6).await;
        let (tx, rx) = mpsc::channel(32);
        tx.try_send(QuizEvent::Violation(ViolationKind::FullscreenExited)).unwrap();
        tx.try_send(QuizEvent::Violation(ViolationKind::FullscreenExited)).unwrap();
        tx.try_send(QuizEvent::FullscreenEntered).unwrap();
        drop(tx);

        let mut runner = QuizRunner::new(flow, Recording::default());
        let outcome = runner.run(session, rx).await.unwrap();

        assert_eq!(outcome, QuizOutcome::Closed);
        assert_eq!(
            runner.presentation().fullscreen_changes,
            vec![true, false, true, false]
        );
        assert_eq!(
            runner.presentation().violations,
            vec![ViolationKind::FullscreenExited]
        );
        let stored = store.load_quiz().await.unwrap().unwrap();
        assert_eq!(stored.violations().count(), 1);
        assert!(stored.is_fullscreen());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_keeps_snapshot_for_resume() {
        let (flow, store, session) = setup(6).await;
        let (tx, rx) = mpsc::channel(32);
        answer_all(&tx, 1);
        tx.try_send(QuizEvent::Select(0)).unwrap();
        drop(tx);

        let mut runner = QuizRunner::new(flow, Recording::default());
        let outcome = runner.run(session, rx).await.unwrap();

        assert_eq!(outcome, QuizOutcome::Closed);
        let stored = store.load_quiz().await.unwrap().unwrap();
        assert_eq!(stored.current_index(), 1);
        assert_eq!(stored.pending_selection(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_without_selection_is_rejected_not_fatal() {
        let (flow, _, session) = setup(1).await;
        let (tx, rx) = mpsc::channel(32);
        tx.try_send(QuizEvent::Submit).unwrap();
        answer_all(&tx, 1);

        let mut runner = QuizRunner::new(flow, Recording::default());
        let outcome = runner.run(session, rx).await.unwrap();

        assert!(matches!(outcome, QuizOutcome::Completed(_)));
        assert_eq!(runner.presentation().rejected, 1);
    }
}
