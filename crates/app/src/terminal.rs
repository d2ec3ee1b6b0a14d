//! Crossterm front end for a running quiz.
//!
//! The alternate screen stands in for fullscreen: Esc leaves it (a violation),
//! F11 re-enters it. Terminal focus loss is the other violation.

use std::io::{self, Stdout, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::style::Print;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{cursor, execute, queue};
use tokio::sync::mpsc;

use quiz_core::session::{QuizSession, SessionStateError, ViolationKind, ViolationTracker};
use services::{Presentation, QuizEvent};
use ui::vm::{QuizScreenVm, format_countdown, option_index, render_plain};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Raw mode and focus reporting for the lifetime of the guard.
pub struct TerminalGuard;

impl TerminalGuard {
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched to raw mode.
    pub fn enable() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnableFocusChange, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            DisableFocusChange,
            LeaveAlternateScreen,
            cursor::Show
        );
        let _ = disable_raw_mode();
    }
}

/// Map a terminal event to a quiz event.
#[must_use]
pub fn map_event(event: &Event) -> Option<QuizEvent> {
    match event {
        Event::FocusLost => Some(QuizEvent::Violation(ViolationKind::FocusLost)),
        Event::Key(key) => map_key(key),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<QuizEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c' | 'q')).then_some(QuizEvent::Quit);
    }
    match key.code {
        KeyCode::Enter => Some(QuizEvent::Submit),
        KeyCode::Tab => Some(QuizEvent::Skip),
        KeyCode::Esc => Some(QuizEvent::Violation(ViolationKind::FullscreenExited)),
        KeyCode::F(11) => Some(QuizEvent::FullscreenEntered),
        KeyCode::Char(c) => option_index(c.to_ascii_lowercase()).map(QuizEvent::Select),
        _ => None,
    }
}

/// Read terminal events on a blocking thread until the quiz drops its receiver.
pub fn spawn_input_reader(tx: mpsc::Sender<QuizEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(POLL_INTERVAL) {
                Ok(false) => {}
                Ok(true) => {
                    let event = match event::read() {
                        Ok(event) => event,
                        Err(err) => {
                            tracing::warn!(error = %err, "terminal read failed");
                            break;
                        }
                    };
                    if let Some(quiz_event) = map_event(&event) {
                        if tx.blocking_send(quiz_event).is_err() {
                            break;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "terminal poll failed");
                    break;
                }
            }
        }
    })
}

/// Draws the quiz screen.
pub struct TerminalPresentation {
    out: Stdout,
    title: String,
    screen: Option<QuizScreenVm>,
    status: Option<String>,
}

impl TerminalPresentation {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            out: io::stdout(),
            title: title.into(),
            screen: None,
            status: None,
        }
    }

    fn redraw(&mut self) {
        let Some(screen) = self.screen.as_ref() else {
            return;
        };
        let lines = screen_lines(&self.title, screen, self.status.as_deref());
        if let Err(err) = draw(&mut self.out, &lines) {
            tracing::warn!(error = %err, "failed to draw quiz screen");
        }
    }
}

fn draw(out: &mut Stdout, lines: &[String]) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    for line in lines {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush()
}

impl Presentation for TerminalPresentation {
    fn enter_fullscreen(&mut self) {
        if let Err(err) = execute!(self.out, EnterAlternateScreen) {
            tracing::warn!(error = %err, "failed to enter alternate screen");
        }
        self.redraw();
    }

    fn exit_fullscreen(&mut self) {
        if let Err(err) = execute!(self.out, LeaveAlternateScreen) {
            tracing::warn!(error = %err, "failed to leave alternate screen");
        }
    }

    fn show_question(&mut self, session: &QuizSession) {
        let next = QuizScreenVm::from_session(session);
        let moved_on = match (&self.screen, &next) {
            (Some(old), Some(new)) => old.heading != new.heading,
            _ => true,
        };
        if moved_on {
            self.status = None;
        }
        self.screen = next;
        self.redraw();
    }

    fn show_tick(&mut self, remaining_secs: u32) {
        if let Some(screen) = self.screen.as_mut() {
            screen.countdown = format_countdown(remaining_secs);
        }
        self.redraw();
    }

    fn show_violation(&mut self, kind: ViolationKind, violations: ViolationTracker) {
        let hint = match kind {
            ViolationKind::FocusLost => "Keep the quiz window focused.",
            ViolationKind::FullscreenExited => "Press F11 to return to fullscreen.",
        };
        self.status = Some(format!(
            "Violation {} of {}: {hint}",
            violations.count(),
            violations.limit()
        ));
        self.redraw();
    }

    fn show_rejected(&mut self, error: &SessionStateError) {
        self.status = Some(match error {
            SessionStateError::NoSelection => "Select an option before submitting.".to_owned(),
            other => other.to_string(),
        });
        self.redraw();
    }
}

/// Lines of the quiz screen, top to bottom.
#[must_use]
pub fn screen_lines(title: &str, screen: &QuizScreenVm, status: Option<&str>) -> Vec<String> {
    let mut lines = vec![
        format!("{title}  |  {}  |  {}", screen.heading, screen.difficulty),
        format!("Time left: {}", screen.countdown),
        String::new(),
        render_plain(&screen.prompt),
        String::new(),
    ];
    for option in &screen.options {
        let marker = if option.is_selected { ">" } else { " " };
        lines.push(format!(
            "{marker} [{}] {}",
            option.key,
            render_plain(&option.label)
        ));
    }
    lines.push(String::new());
    if let Some(warning) = &screen.warning {
        lines.push(warning.clone());
    }
    if let Some(status) = status {
        lines.push(status.to_owned());
    }
    lines.push("Keys: option key to select, Enter submit, Tab skip, Ctrl-C quit".to_owned());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, Question, QuestionId, Rating, TopicId};
    use quiz_core::session::SessionPolicy;
    use quiz_core::time::fixed_now;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keys_map_to_quiz_events() {
        assert_eq!(map_event(&press(KeyCode::Char('2'))), Some(QuizEvent::Select(1)));
        assert_eq!(map_event(&press(KeyCode::Enter)), Some(QuizEvent::Submit));
        assert_eq!(map_event(&press(KeyCode::Tab)), Some(QuizEvent::Skip));
        assert_eq!(
            map_event(&press(KeyCode::Esc)),
            Some(QuizEvent::Violation(ViolationKind::FullscreenExited))
        );
        assert_eq!(map_event(&press(KeyCode::F(11))), Some(QuizEvent::FullscreenEntered));
        assert_eq!(
            map_event(&Event::FocusLost),
            Some(QuizEvent::Violation(ViolationKind::FocusLost))
        );
        assert_eq!(map_event(&Event::FocusGained), None);

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c), Some(QuizEvent::Quit));
    }

    #[test]
    fn screen_shows_prompt_options_and_selection() {
        let question = Question::new(
            QuestionId::new("q1").unwrap(),
            "What is $\\frac{1}{4}$ of 80?",
            vec!["20".into(), "40".into()],
            0,
            Difficulty::Easy,
            "",
        )
        .unwrap();
        let mut session = QuizSession::start(
            TopicId::new("fractions").unwrap(),
            Rating::new(2).unwrap(),
            vec![question],
            SessionPolicy::default(),
            fixed_now(),
        )
        .unwrap();
        session.select(0).unwrap();

        let screen = QuizScreenVm::from_session(&session).unwrap();
        let lines = screen_lines("fractions", &screen, Some("Select an option"));
        assert_eq!(lines[1], "Time left: 1:00");
        assert_eq!(lines[3], "What is 1/4 of 80?");
        assert_eq!(lines[5], "> [1] 20");
        assert_eq!(lines[6], "  [2] 40");
        assert!(lines.iter().any(|l| l == "Select an option"));
    }
}
