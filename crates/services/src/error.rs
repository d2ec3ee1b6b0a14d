//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::session::SessionStateError;
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz API client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("quiz api request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("quiz api returned an invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while starting or driving a quiz.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("guidelines must be accepted before starting a quiz")]
    GuidelinesNotAccepted,
    #[error("questions are already being loaded")]
    AlreadyLoading,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    State(#[from] SessionStateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `OnboardingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OnboardingError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
