use chrono::Duration;

use quiz_core::Clock;
use quiz_core::model::ResultRecord;
use storage::SessionStore;

use crate::error::ResultsError;

/// Read access to the last stored quiz result, honoring its expiry.
#[derive(Clone)]
pub struct ResultsService {
    clock: Clock,
    store: SessionStore,
    ttl: Duration,
}

impl ResultsService {
    #[must_use]
    pub fn new(clock: Clock, store: SessionStore, ttl: Duration) -> Self {
        Self { clock, store, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The last result, or `None` if nothing is stored or it has expired.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError` on storage failures.
    pub async fn latest(&self) -> Result<Option<ResultRecord>, ResultsError> {
        Ok(self.store.load_results(self.clock.now(), self.ttl).await?)
    }

    /// # Errors
    ///
    /// Returns `ResultsError` on storage failures.
    pub async fn clear(&self) -> Result<(), ResultsError> {
        self.store.clear_results().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::fixtures::questions;
    use quiz_core::model::{Rating, ResultDetail, TopicId};
    use quiz_core::time::fixed_now;
    use storage::Storage;

    fn record() -> ResultRecord {
        let details = questions(2)
            .into_iter()
            .map(|question| ResultDetail {
                selected: Some(question.correct()),
                question,
            })
            .collect();
        ResultRecord::from_details(
            TopicId::new("profit-loss").unwrap(),
            Rating::new(3).unwrap(),
            details,
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn result_visible_until_ttl_passes() {
        let store = Storage::in_memory().session_store();
        store.save_results(&record()).await.unwrap();
        let ttl = Duration::hours(24);

        let at = |offset: Duration| {
            ResultsService::new(Clock::fixed(fixed_now() + offset), store.clone(), ttl)
        };

        let almost = at(Duration::hours(23) + Duration::minutes(59));
        assert_eq!(almost.latest().await.unwrap().unwrap().score(), 2);

        let expired = at(Duration::hours(24) + Duration::seconds(1));
        assert!(expired.latest().await.unwrap().is_none());
        assert!(almost.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_result() {
        let store = Storage::in_memory().session_store();
        store.save_results(&record()).await.unwrap();
        let service = ResultsService::new(Clock::fixed(fixed_now()), store, Duration::hours(24));

        service.clear().await.unwrap();
        assert!(service.latest().await.unwrap().is_none());
    }
}
