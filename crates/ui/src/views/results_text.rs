use crate::vm::{OptionMark, ResultsPageVm, render_plain};

/// Render the results page as plain text for a terminal.
#[must_use]
pub fn render_results_text(page: &ResultsPageVm) -> String {
    let ResultsPageVm::Ready(result) = page else {
        return "No results available. Take a quiz to see your score here.\n".to_owned();
    };

    let mut out = format!(
        "Results for {} (rating {}, {})\nScore: {} / {} ({}%)\nCompleted: {}\n",
        result.topic,
        result.rating,
        result.difficulty,
        result.score,
        result.total,
        result.percent,
        result.completed_at_str,
    );

    for question in &result.questions {
        out.push_str(&format!(
            "\n{}. {}\n",
            question.number,
            render_plain(&question.prompt)
        ));
        for option in &question.options {
            let marker = match option.mark {
                OptionMark::Correct => "[✓]",
                OptionMark::WrongSelection => "[✗]",
                OptionMark::Plain => "[ ]",
            };
            let yours = if option.is_selected { "  <- your answer" } else { "" };
            out.push_str(&format!("   {marker} {}{yours}\n", render_plain(&option.label)));
        }
        out.push_str(&format!("   {}\n", question.verdict.label()));
        if !question.explanation.is_empty() {
            out.push_str(&format!("   {}\n", render_plain(&question.explanation)));
        }
    }
    out
}
