mod results;
mod results_text;

pub use results::{ResultsPage, render_results_fragment, render_results_html};
pub use results_text::render_results_text;
