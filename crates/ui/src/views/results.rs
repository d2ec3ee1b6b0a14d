use dioxus::prelude::*;

use crate::vm::{MathSegment, ResultQuestionVm, ResultVm, ResultsPageVm};

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
.math{font-family:serif;font-style:italic}\
.option{list-style:none;padding:.25rem .5rem;margin:.25rem 0;border-radius:4px}\
.correct{background:#dcfce7}.wrong{background:#fee2e2}\
.verdict{font-weight:bold}.explanation{color:#374151}";

#[component]
pub fn ResultsPage(page: ResultsPageVm) -> Element {
    rsx! {
        div { class: "page results",
            h2 { "Quiz Results" }

            match page {
                ResultsPageVm::NoResults => rsx! {
                    p { class: "empty", "No results available. Take a quiz to see your score here." }
                },
                ResultsPageVm::Ready(result) => rsx! {
                    ResultSummary { result: result.clone() }
                },
            }
        }
    }
}

#[component]
fn ResultSummary(result: ResultVm) -> Element {
    rsx! {
        dl { class: "summary",
            dt { "Topic" }
            dd { "{result.topic}" }

            dt { "Rating" }
            dd { "{result.rating} ({result.difficulty})" }

            dt { "Score" }
            dd { "{result.score} / {result.total} ({result.percent}%)" }

            dt { "Completed" }
            dd { "{result.completed_at_str}" }
        }

        ol { class: "questions",
            {result.questions.iter().map(|question| rsx! {
                QuestionResult { key: "{question.number}", question: question.clone() }
            })}
        }
    }
}

#[component]
fn QuestionResult(question: ResultQuestionVm) -> Element {
    rsx! {
        li { class: "question",
            p { class: "prompt", MathText { segments: question.prompt.clone() } }
            ul { class: "options",
                {question.options.iter().map(|option| rsx! {
                    li { class: option.mark.css_class(),
                        MathText { segments: option.label.clone() }
                        if option.is_selected {
                            span { class: "your-answer", " (your answer)" }
                        }
                    }
                })}
            }
            p { class: "verdict", "{question.verdict.label()}" }
            if !question.explanation.is_empty() {
                p { class: "explanation", MathText { segments: question.explanation.clone() } }
            }
        }
    }
}

#[component]
fn MathText(segments: Vec<MathSegment>) -> Element {
    rsx! {
        {segments.iter().map(|segment| match segment {
            MathSegment::Text(text) => rsx! { span { "{text}" } },
            MathSegment::Math(_) => rsx! {
                span { class: "math", "{segment.plain_text()}" }
            },
        })}
    }
}

/// Render the results page body to an HTML fragment.
#[must_use]
pub fn render_results_fragment(page: &ResultsPageVm) -> String {
    let mut dom = VirtualDom::new_with_props(ResultsPage, ResultsPageProps { page: page.clone() });
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

/// Render the results page as a standalone HTML document.
#[must_use]
pub fn render_results_html(page: &ResultsPageVm) -> String {
    let body = render_results_fragment(page);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Quiz Results</title><style>{STYLE}</style></head>\
         <body>{body}</body></html>\n"
    )
}
