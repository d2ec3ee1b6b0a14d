mod math;
mod quiz_vm;
mod result_vm;
mod time_fmt;
mod topic_vm;

pub use math::{MathSegment, parse_inline_math, render_plain};
pub use quiz_vm::{QuizOptionVm, QuizScreenVm, option_index, option_key};
pub use result_vm::{
    AnswerVerdict, OptionMark, ResultOptionVm, ResultQuestionVm, ResultVm, ResultsPageVm,
    map_result, map_results_page,
};
pub use time_fmt::{format_countdown, format_datetime};
pub use topic_vm::{RatingOptionVm, TopicCardVm, map_topic_cards, rating_options};
