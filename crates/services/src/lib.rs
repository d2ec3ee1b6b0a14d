#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod config;
pub mod error;
pub mod onboarding_service;
pub mod quiz;
pub mod results_service;

pub use quiz_core::Clock;

pub use api::{HttpQuizApi, QuizApi, spawn_warm_up};
pub use app_services::AppServices;
pub use config::QuizConfig;
pub use error::{
    ApiError, AppServicesError, ConfigError, OnboardingError, QuizFlowError, ResultsError,
};
pub use onboarding_service::OnboardingService;
pub use quiz::{
    FlowStep, Headless, Presentation, QuizEvent, QuizFlowService, QuizOutcome, QuizProgress,
    QuizRunner, QuizStart,
};
pub use results_service::ResultsService;
