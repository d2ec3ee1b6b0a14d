use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Question, Rating, TopicId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("total ({total}) does not match detail count ({details})")]
    TotalMismatch { total: u32, details: usize },

    #[error("score ({score}) does not match correct answers ({correct})")]
    ScoreMismatch { score: u32, correct: u32 },

    #[error("detail {index}: selected option {selected} does not exist")]
    SelectionOutOfRange { index: usize, selected: usize },

    #[error("too many questions for a single result: {0}")]
    TooManyQuestions(usize),
}

/// Per-question outcome within a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDetail {
    pub question: Question,
    pub selected: Option<usize>,
}

impl ResultDetail {
    #[must_use]
    pub fn correct(&self) -> usize {
        self.question.correct()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        self.question.explanation()
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected == Some(self.question.correct())
    }
}

/// Scored outcome of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResultRecordRepr", into = "ResultRecordRepr")]
pub struct ResultRecord {
    topic_id: TopicId,
    rating: Rating,
    score: u32,
    total: u32,
    details: Vec<ResultDetail>,
    created_at: DateTime<Utc>,
}

impl ResultRecord {
    /// Score a list of details.
    ///
    /// # Errors
    ///
    /// Returns `ResultError` if a selection does not exist on its question or
    /// the detail count does not fit in `u32`.
    pub fn from_details(
        topic_id: TopicId,
        rating: Rating,
        details: Vec<ResultDetail>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ResultError> {
        let total = u32::try_from(details.len())
            .map_err(|_| ResultError::TooManyQuestions(details.len()))?;
        let score = count_correct(&details);
        Self::from_persisted(topic_id, rating, score, total, details, created_at)
    }

    /// Rehydrate a result from storage, re-checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns `ResultError::TotalMismatch` or `ResultError::ScoreMismatch` if the
    /// stored counters disagree with the details.
    pub fn from_persisted(
        topic_id: TopicId,
        rating: Rating,
        score: u32,
        total: u32,
        details: Vec<ResultDetail>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ResultError> {
        if usize::try_from(total).ok() != Some(details.len()) {
            return Err(ResultError::TotalMismatch {
                total,
                details: details.len(),
            });
        }
        for (index, detail) in details.iter().enumerate() {
            match detail.selected {
                Some(selected) if !detail.question.has_option(selected) => {
                    return Err(ResultError::SelectionOutOfRange { index, selected });
                }
                _ => {}
            }
        }
        let correct = count_correct(&details);
        if correct != score {
            return Err(ResultError::ScoreMismatch { score, correct });
        }

        Ok(Self {
            topic_id,
            rating,
            score,
            total,
            details,
            created_at,
        })
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn rating(&self) -> Rating {
        self.rating
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn details(&self) -> &[ResultDetail] {
        &self.details
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A result is expired once its age is strictly greater than `ttl`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.created_at) > ttl
    }
}

fn count_correct(details: &[ResultDetail]) -> u32 {
    details
        .iter()
        .filter(|d| d.is_correct())
        .fold(0_u32, |acc, _| acc.saturating_add(1))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultRecordRepr {
    topic_id: TopicId,
    rating: Rating,
    score: u32,
    total: u32,
    details: Vec<ResultDetail>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ResultRecordRepr> for ResultRecord {
    type Error = ResultError;

    fn try_from(repr: ResultRecordRepr) -> Result<Self, Self::Error> {
        Self::from_persisted(
            repr.topic_id,
            repr.rating,
            repr.score,
            repr.total,
            repr.details,
            repr.created_at,
        )
    }
}

impl From<ResultRecord> for ResultRecordRepr {
    fn from(r: ResultRecord) -> Self {
        Self {
            topic_id: r.topic_id,
            rating: r.rating,
            score: r.score,
            total: r.total,
            details: r.details,
            created_at: r.created_at,
        }
    }
}
