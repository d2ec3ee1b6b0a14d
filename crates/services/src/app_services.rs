use std::sync::Arc;

use storage::Storage;

use crate::Clock;
use crate::api::{HttpQuizApi, QuizApi};
use crate::config::QuizConfig;
use crate::error::AppServicesError;
use crate::onboarding_service::OnboardingService;
use crate::quiz::QuizFlowService;
use crate::results_service::ResultsService;

/// Assembles app-facing services from one storage backend and one API client.
#[derive(Clone)]
pub struct AppServices {
    api: Arc<dyn QuizApi>,
    quiz_flow: Arc<QuizFlowService>,
    results: Arc<ResultsService>,
    onboarding: Arc<OnboardingService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or HTTP client setup fails.
    pub async fn new_sqlite(config: &QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let api = HttpQuizApi::new(config.api_base_url.clone(), config.http_timeout)?;
        Ok(Self::from_parts(config, clock, &storage, Arc::new(api)))
    }

    /// Build services over explicit collaborators.
    #[must_use]
    pub fn from_parts(
        config: &QuizConfig,
        clock: Clock,
        storage: &Storage,
        api: Arc<dyn QuizApi>,
    ) -> Self {
        let store = storage.session_store();
        let quiz_flow = Arc::new(QuizFlowService::new(
            clock,
            Arc::clone(&api),
            store.clone(),
            config.policy,
            config.resume_window,
        ));
        let results = Arc::new(ResultsService::new(
            clock,
            store.clone(),
            config.results_ttl,
        ));
        let onboarding = Arc::new(OnboardingService::new(store));

        Self {
            api,
            quiz_flow,
            results,
            onboarding,
        }
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn QuizApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn quiz_flow(&self) -> Arc<QuizFlowService> {
        Arc::clone(&self.quiz_flow)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsService> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn onboarding(&self) -> Arc<OnboardingService> {
        Arc::clone(&self.onboarding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::fixtures::{FakeApi, questions};
    use quiz_core::model::{Rating, TopicId};
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn services_share_one_store() {
        let storage = Storage::in_memory();
        let services = AppServices::from_parts(
            &QuizConfig::default(),
            Clock::fixed(fixed_now()),
            &storage,
            Arc::new(FakeApi::with_questions(questions(1))),
        );

        services.onboarding().accept_guidelines().await.unwrap();
        let mut session = services
            .quiz_flow()
            .begin(TopicId::new("profit-loss").unwrap(), Rating::new(3).unwrap())
            .await
            .unwrap()
            .into_session();
        services
            .quiz_flow()
            .apply(&mut session, crate::quiz::QuizEvent::Skip)
            .await
            .unwrap();

        let latest = services.results().latest().await.unwrap().unwrap();
        assert_eq!((latest.score(), latest.total()), (0, 1));
    }
}
