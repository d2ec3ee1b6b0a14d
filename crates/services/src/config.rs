use std::env;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use quiz_core::session::SessionPolicy;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_DB_URL: &str = "sqlite://quizzer.sqlite3";
pub const DEFAULT_RESUME_WINDOW_MINS: i64 = 60;
pub const DEFAULT_RESULTS_TTL_HOURS: i64 = 24;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Runtime settings, read from `QUIZ_*` environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub api_base_url: String,
    pub db_url: String,
    pub policy: SessionPolicy,
    pub resume_window: Duration,
    pub results_ttl: Duration,
    pub http_timeout: StdDuration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            db_url: DEFAULT_DB_URL.into(),
            policy: SessionPolicy::default(),
            resume_window: Duration::minutes(DEFAULT_RESUME_WINDOW_MINS),
            results_ttl: Duration::hours(DEFAULT_RESULTS_TTL_HOURS),
            http_timeout: StdDuration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl QuizConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set but unparsable, zero or
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set but unparsable, zero or
    /// out of range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let text = |var: &str, default: String| {
            lookup(var)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let question_secs = positive(&lookup, "QUIZ_QUESTION_SECS", defaults.policy.question_secs)?;
        let violation_limit =
            positive(&lookup, "QUIZ_VIOLATION_LIMIT", defaults.policy.violation_limit)?;
        let resume_mins = positive(&lookup, "QUIZ_RESUME_WINDOW_MINS", DEFAULT_RESUME_WINDOW_MINS)?;
        let ttl_hours = positive(&lookup, "QUIZ_RESULTS_TTL_HOURS", DEFAULT_RESULTS_TTL_HOURS)?;
        let timeout_secs = positive(&lookup, "QUIZ_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            api_base_url: text("QUIZ_API_BASE_URL", defaults.api_base_url),
            db_url: text("QUIZ_DB_URL", defaults.db_url),
            policy: SessionPolicy {
                question_secs,
                violation_limit,
            },
            resume_window: span(
                "QUIZ_RESUME_WINDOW_MINS",
                resume_mins,
                Duration::try_minutes(resume_mins),
            )?,
            results_ttl: span(
                "QUIZ_RESULTS_TTL_HOURS",
                ttl_hours,
                Duration::try_hours(ttl_hours),
            )?,
            http_timeout: StdDuration::from_secs(timeout_secs),
        })
    }
}

fn span(var: &'static str, raw: i64, value: Option<Duration>) -> Result<Duration, ConfigError> {
    value.ok_or_else(|| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

fn positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    match raw.parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_owned(),
        }),
    }
}
