use clap::{Parser, Subcommand};
use quiz_core::model::{Rating, TopicId};
use ui::Route;

#[derive(Debug, Parser)]
#[command(name = "quizzer", version, about = "Adaptive math quizzes in the terminal")]
pub struct Cli {
    /// SQLite database URL or path
    #[arg(long, global = true, env = "QUIZ_DB_URL")]
    pub db: Option<String>,

    /// Base URL of the quiz API
    #[arg(long, global = true, env = "QUIZ_API_BASE_URL")]
    pub api: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List quiz topics
    Topics,

    /// Show the self-rating scale for a topic
    Rate { topic: TopicId },

    /// Show the quiz rules, optionally accepting them
    Guidelines {
        topic: TopicId,
        #[arg(long, value_parser = parse_rating)]
        rating: Rating,
        #[arg(long)]
        accept: bool,
    },

    /// Take (or resume) a timed quiz
    Quiz {
        topic: TopicId,
        #[arg(long, value_parser = parse_rating)]
        rating: Rating,
    },

    /// Show the last quiz result
    Results {
        /// Also write an HTML report to this path
        #[arg(long)]
        html: Option<std::path::PathBuf>,
        /// Delete the stored result
        #[arg(long)]
        clear: bool,
    },

    /// Sign in (any non-empty name)
    Login { username: String },

    /// Sign out
    Logout,
}

impl Command {
    /// Screen this command corresponds to, if any.
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Topics => Some(Route::Topics),
            Command::Rate { topic } => Some(Route::Rate {
                topic: topic.clone(),
            }),
            Command::Guidelines { topic, rating, .. } => Some(Route::Guidelines {
                topic: topic.clone(),
                rating: *rating,
            }),
            Command::Quiz { topic, rating } => Some(Route::Quiz {
                topic: topic.clone(),
                rating: *rating,
            }),
            Command::Results { .. } => Some(Route::Results),
            Command::Login { .. } | Command::Logout => None,
        }
    }
}

fn parse_rating(raw: &str) -> Result<Rating, String> {
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| format!("rating must be a number from 1 to 5, got {raw}"))?;
    Rating::new(value).map_err(|e| e.to_string())
}
