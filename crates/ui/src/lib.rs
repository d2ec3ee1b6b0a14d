#![forbid(unsafe_code)]

pub mod routes;
pub mod vm;
pub mod views;

pub use routes::{Route, RouteParseError};
pub use views::{ResultsPage, render_results_html, render_results_text};
