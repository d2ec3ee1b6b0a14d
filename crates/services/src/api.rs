use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use quiz_core::model::{Difficulty, Question, QuestionId, Rating, Topic, TopicId};

use crate::error::ApiError;

/// Remote collaborator serving topics and questions.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Fetch all topics, in server order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status or payload failures.
    async fn fetch_topics(&self) -> Result<Vec<Topic>, ApiError>;

    /// Fetch the question list for a topic at the given rating.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status or payload failures.
    async fn fetch_questions(
        &self,
        topic: &TopicId,
        rating: Rating,
    ) -> Result<Vec<Question>, ApiError>;

    /// Health endpoint, used to wake a cold server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server is unreachable or unhealthy.
    async fn ping(&self) -> Result<(), ApiError>;
}

/// Fire a health check in the background and ignore the outcome.
pub fn spawn_warm_up(api: Arc<dyn QuizApi>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match api.ping().await {
            Ok(()) => tracing::debug!("quiz api warm-up succeeded"),
            Err(err) => tracing::debug!(error = %err, "quiz api warm-up failed"),
        }
    })
}

//
// ─── HTTP CLIENT ──────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    base_url: String,
}

impl HttpQuizApi {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "quiz api request");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidPayload(e.to_string()))
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn fetch_topics(&self) -> Result<Vec<Topic>, ApiError> {
        let body: Listing<TopicDto> = self.get_json("/topics").await?;
        body.into_items()
            .into_iter()
            .map(TopicDto::into_topic)
            .collect()
    }

    async fn fetch_questions(
        &self,
        topic: &TopicId,
        rating: Rating,
    ) -> Result<Vec<Question>, ApiError> {
        let path = format!("/questions/{topic}/{rating}");
        let body: Listing<QuestionDto> = self.get_json(&path).await?;
        body.into_items()
            .into_iter()
            .map(QuestionDto::into_question)
            .collect()
    }

    async fn ping(&self) -> Result<(), ApiError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

//
// ─── WIRE FORMAT ──────────────────────────────────────────────────────────────
//

/// Lists arrive either bare or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "topics", alias = "questions")]
        data: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicDto {
    #[serde(alias = "_id", alias = "slug")]
    id: String,
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: Option<String>,
}

impl TopicDto {
    fn into_topic(self) -> Result<Topic, ApiError> {
        let id = TopicId::new(self.id).map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
        let topic = Topic::new(id, self.name, self.description);
        Ok(match self.icon {
            Some(icon) if !icon.trim().is_empty() => topic.with_icon(icon),
            _ => topic,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    #[serde(alias = "_id")]
    id: String,
    #[serde(alias = "question", alias = "text")]
    prompt: String,
    options: Vec<String>,
    #[serde(alias = "correctAnswer", alias = "correctIndex")]
    correct: usize,
    difficulty: String,
    #[serde(default)]
    explanation: String,
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, ApiError> {
        let invalid = |e: &dyn std::fmt::Display| ApiError::InvalidPayload(e.to_string());
        let id = QuestionId::new(self.id).map_err(|e| invalid(&e))?;
        let difficulty = Difficulty::parse(&self.difficulty).map_err(|e| invalid(&e))?;
        Question::new(
            id,
            self.prompt,
            self.options,
            self.correct,
            difficulty,
            self.explanation,
        )
        .map_err(|e| invalid(&e))
    }
}
