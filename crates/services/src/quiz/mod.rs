//! Quiz lifecycle: starting or resuming, the event loop, and its countdown.

mod countdown;
mod flow;
mod presentation;
mod progress;
mod runner;

pub use countdown::Countdown;
pub use flow::{FlowStep, QuizEvent, QuizFlowService, QuizStart};
pub use presentation::{Headless, Presentation};
pub use progress::QuizProgress;
pub use runner::{QuizOutcome, QuizRunner};
