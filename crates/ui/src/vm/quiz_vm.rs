use quiz_core::session::QuizSession;
use services::QuizProgress;

use crate::vm::math::{MathSegment, parse_inline_math};
use crate::vm::time_fmt::format_countdown;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizOptionVm {
    pub key: char,
    pub label: Vec<MathSegment>,
    pub is_selected: bool,
}

/// Everything the quiz screen shows for the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizScreenVm {
    pub heading: String,
    pub prompt: Vec<MathSegment>,
    pub options: Vec<QuizOptionVm>,
    pub countdown: String,
    pub difficulty: &'static str,
    pub warning: Option<String>,
    pub can_submit: bool,
}

impl QuizScreenVm {
    /// `None` once the session has no current question.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let question = session.current_question()?;
        let progress = QuizProgress::from_session(session);
        let pending = session.pending_selection();

        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(i, option)| QuizOptionVm {
                key: option_key(i),
                label: parse_inline_math(option),
                is_selected: pending == Some(i),
            })
            .collect();

        let warning = (progress.violations > 0).then(|| {
            format!(
                "Warning {} of {}: stay on the quiz window or the attempt is abandoned.",
                progress.violations, progress.violation_limit
            )
        });

        Some(Self {
            heading: format!("Question {} of {}", progress.position(), progress.total),
            prompt: parse_inline_math(question.prompt()),
            options,
            countdown: format_countdown(progress.remaining_secs),
            difficulty: question.difficulty().as_str(),
            warning,
            can_submit: pending.is_some(),
        })
    }
}

/// `1`..`9`, then `a`.. for longer option lists.
#[must_use]
pub fn option_key(index: usize) -> char {
    match u32::try_from(index) {
        Ok(i) if i < 9 => char::from_digit(i + 1, 10).unwrap_or('?'),
        Ok(i) if i < 9 + 26 => char::from_u32(u32::from('a') + i - 9).unwrap_or('?'),
        _ => '?',
    }
}

/// Inverse of [`option_key`].
#[must_use]
pub fn option_index(key: char) -> Option<usize> {
    match key {
        '1'..='9' => key.to_digit(10).map(|d| d as usize - 1),
        'a'..='z' => Some(key as usize - 'a' as usize + 9),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, Question, QuestionId, Rating, TopicId};
    use quiz_core::session::{SessionPolicy, ViolationKind};
    use quiz_core::time::fixed_now;

    fn session() -> QuizSession {
        let questions = (0..3)
            .map(|i| {
                Question::new(
                    QuestionId::new(format!("q{i}")).unwrap(),
                    "Solve $3x = 12$",
                    vec!["3".into(), "4".into()],
                    1,
                    Difficulty::Easy,
                    "",
                )
                .unwrap()
            })
            .collect();
        QuizSession::start(
            TopicId::new("algebra").unwrap(),
            Rating::new(1).unwrap(),
            questions,
            SessionPolicy::default(),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn screen_reflects_position_selection_and_timer() {
        let mut s = session();
        s.skip(fixed_now()).unwrap();
        s.select(1).unwrap();
        s.tick(17, fixed_now()).unwrap();
        s.record_violation(ViolationKind::FocusLost).unwrap();

        let vm = QuizScreenVm::from_session(&s).unwrap();
        assert_eq!(vm.heading, "Question 2 of 3");
        assert_eq!(vm.countdown, "0:43");
        assert!(vm.options[1].is_selected);
        assert!(vm.can_submit);
        assert_eq!(vm.options[0].key, '1');
        assert!(vm.warning.unwrap().starts_with("Warning 1 of 3"));
    }

    #[test]
    fn finished_session_has_no_screen() {
        let mut s = session();
        for _ in 0..3 {
            s.skip(fixed_now()).unwrap();
        }
        assert!(QuizScreenVm::from_session(&s).is_none());
    }

    #[test]
    fn option_keys_round_trip() {
        for index in [0, 8, 9, 20] {
            assert_eq!(option_index(option_key(index)), Some(index));
        }
        assert_eq!(option_index('0'), None);
    }
}
