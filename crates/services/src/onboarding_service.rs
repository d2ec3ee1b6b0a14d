use storage::SessionStore;

use crate::error::OnboardingError;

/// Placeholder login plus guideline acceptance. Any non-empty username is
/// accepted; there is no credential check.
#[derive(Clone)]
pub struct OnboardingService {
    store: SessionStore,
}

impl OnboardingService {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `OnboardingError::EmptyUsername` for a blank name, or a storage error.
    pub async fn login(&self, username: &str) -> Result<(), OnboardingError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(OnboardingError::EmptyUsername);
        }
        self.store.set_authenticated(true).await?;
        tracing::info!(%username, "logged in");
        Ok(())
    }

    /// Clears the auth flag and any guideline acceptance.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::Storage` on storage failures.
    pub async fn logout(&self) -> Result<(), OnboardingError> {
        self.store.set_authenticated(false).await?;
        self.store.set_guidelines_accepted(false).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `OnboardingError::Storage` on storage failures.
    pub async fn is_authenticated(&self) -> Result<bool, OnboardingError> {
        Ok(self.store.is_authenticated().await?)
    }

    /// # Errors
    ///
    /// Returns `OnboardingError::Storage` on storage failures.
    pub async fn accept_guidelines(&self) -> Result<(), OnboardingError> {
        self.store.set_guidelines_accepted(true).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `OnboardingError::Storage` on storage failures.
    pub async fn guidelines_accepted(&self) -> Result<bool, OnboardingError> {
        Ok(self.store.guidelines_accepted().await?)
    }
}
