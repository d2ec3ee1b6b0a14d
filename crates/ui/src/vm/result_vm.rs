use quiz_core::model::{ResultDetail, ResultRecord};

use crate::vm::math::{MathSegment, parse_inline_math};
use crate::vm::time_fmt::format_datetime;

/// How an option is marked in the results list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    /// The correct option (selected or not).
    Correct,
    /// The user's selection, when it is not the correct option.
    WrongSelection,
    Plain,
}

impl OptionMark {
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            OptionMark::Correct => "option correct",
            OptionMark::WrongSelection => "option selected wrong",
            OptionMark::Plain => "option",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerVerdict {
    Correct,
    Incorrect,
    Unanswered,
}

impl AnswerVerdict {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AnswerVerdict::Correct => "Correct",
            AnswerVerdict::Incorrect => "Incorrect",
            AnswerVerdict::Unanswered => "Not answered",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultOptionVm {
    pub label: Vec<MathSegment>,
    pub mark: OptionMark,
    pub is_selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultQuestionVm {
    pub number: usize,
    pub prompt: Vec<MathSegment>,
    pub options: Vec<ResultOptionVm>,
    pub explanation: Vec<MathSegment>,
    pub verdict: AnswerVerdict,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub topic: String,
    pub rating: u8,
    pub difficulty: &'static str,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
    pub completed_at_str: String,
    pub questions: Vec<ResultQuestionVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultsPageVm {
    NoResults,
    Ready(ResultVm),
}

/// Build the results page. `None` (nothing stored, or expired) yields the
/// "no results" fallback.
#[must_use]
pub fn map_results_page(record: Option<&ResultRecord>) -> ResultsPageVm {
    record.map_or(ResultsPageVm::NoResults, |record| {
        ResultsPageVm::Ready(map_result(record))
    })
}

#[must_use]
pub fn map_result(record: &ResultRecord) -> ResultVm {
    let percent = if record.total() == 0 {
        0
    } else {
        record.score() * 100 / record.total()
    };
    ResultVm {
        topic: record.topic_id().to_string(),
        rating: record.rating().value(),
        difficulty: record.rating().difficulty().as_str(),
        score: record.score(),
        total: record.total(),
        percent,
        completed_at_str: format_datetime(record.created_at()),
        questions: record
            .details()
            .iter()
            .enumerate()
            .map(|(i, detail)| map_detail(i + 1, detail))
            .collect(),
    }
}

fn map_detail(number: usize, detail: &ResultDetail) -> ResultQuestionVm {
    let correct = detail.correct();
    let options = detail
        .question
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let is_selected = detail.selected == Some(i);
            let mark = if i == correct {
                OptionMark::Correct
            } else if is_selected {
                OptionMark::WrongSelection
            } else {
                OptionMark::Plain
            };
            ResultOptionVm {
                label: parse_inline_math(option),
                mark,
                is_selected,
            }
        })
        .collect();

    let verdict = match detail.selected {
        None => AnswerVerdict::Unanswered,
        Some(_) if detail.is_correct() => AnswerVerdict::Correct,
        Some(_) => AnswerVerdict::Incorrect,
    };

    ResultQuestionVm {
        number,
        prompt: parse_inline_math(detail.question.prompt()),
        options,
        explanation: parse_inline_math(detail.explanation()),
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, Question, QuestionId, Rating, TopicId};
    use quiz_core::time::fixed_now;

    fn detail(id: &str, selected: Option<usize>) -> ResultDetail {
        ResultDetail {
            question: Question::new(
                QuestionId::new(id).unwrap(),
                "Cost $200$, sold for $250$. Profit %?",
                vec!["20%".into(), "$25\\%$".into(), "50%".into()],
                1,
                Difficulty::Medium,
                "$\\frac{50}{200} = 25\\%$",
            )
            .unwrap(),
            selected,
        }
    }

    fn record() -> ResultRecord {
        ResultRecord::from_details(
            TopicId::new("profit-loss").unwrap(),
            Rating::new(3).unwrap(),
            vec![detail("q1", Some(1)), detail("q2", Some(2)), detail("q3", None)],
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn marks_correct_and_wrong_selections() {
        let vm = map_result(&record());
        assert_eq!((vm.score, vm.total, vm.percent), (1, 3, 33));
        assert_eq!(vm.difficulty, "medium");

        let right = &vm.questions[0];
        assert_eq!(right.verdict, AnswerVerdict::Correct);
        assert_eq!(right.options[1].mark, OptionMark::Correct);
        assert!(right.options[1].is_selected);

        let wrong = &vm.questions[1];
        assert_eq!(wrong.verdict, AnswerVerdict::Incorrect);
        assert_eq!(wrong.options[1].mark, OptionMark::Correct);
        assert_eq!(wrong.options[2].mark, OptionMark::WrongSelection);
        assert_eq!(wrong.options[0].mark, OptionMark::Plain);

        let skipped = &vm.questions[2];
        assert_eq!(skipped.verdict, AnswerVerdict::Unanswered);
        assert!(skipped.options.iter().all(|o| !o.is_selected));
    }

    #[test]
    fn math_spans_are_resolved() {
        let vm = map_result(&record());
        let q = &vm.questions[0];
        assert_eq!(q.prompt[1], MathSegment::Math("200".into()));
        assert!(q.options[1].label[0].is_math());
        assert!(q.explanation.iter().all(MathSegment::is_math));
    }

    #[test]
    fn mapping_is_idempotent() {
        let record = record();
        assert_eq!(map_result(&record), map_result(&record));
    }

    #[test]
    fn missing_record_falls_back() {
        assert_eq!(map_results_page(None), ResultsPageVm::NoResults);
        assert!(matches!(
            map_results_page(Some(&record())),
            ResultsPageVm::Ready(_)
        ));
    }
}
