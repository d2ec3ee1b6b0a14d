use std::fmt;
use std::str::FromStr;

use quiz_core::model::{Rating, TopicId};
use thiserror::Error;

/// Navigable screens of the quiz client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Topics,
    Rate { topic: TopicId },
    Guidelines { topic: TopicId, rating: Rating },
    Quiz { topic: TopicId, rating: Rating },
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown route: {0}")]
pub struct RouteParseError(pub String);

impl Route {
    /// The screen that follows this one in the normal flow.
    #[must_use]
    pub fn next(&self) -> Option<Route> {
        match self {
            Route::Topics | Route::Rate { .. } | Route::Results => None,
            Route::Guidelines { topic, rating } => Some(Route::Quiz {
                topic: topic.clone(),
                rating: *rating,
            }),
            Route::Quiz { .. } => Some(Route::Results),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Topics => f.write_str("/"),
            Route::Rate { topic } => write!(f, "/topics/{topic}/rate"),
            Route::Guidelines { topic, rating } => write!(f, "/guidelines/{topic}/{rating}"),
            Route::Quiz { topic, rating } => write!(f, "/quiz/{topic}/{rating}"),
            Route::Results => f.write_str("/results"),
        }
    }
}

impl FromStr for Route {
    type Err = RouteParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || RouteParseError(raw.to_owned());
        let parts: Vec<&str> = raw.trim_matches('/').split('/').collect();
        let topic = |s: &str| TopicId::new(s).map_err(|_| err());
        let rating = |s: &str| {
            s.parse::<u8>()
                .ok()
                .and_then(|v| Rating::new(v).ok())
                .ok_or_else(err)
        };

        match parts.as_slice() {
            [""] | ["topics"] => Ok(Route::Topics),
            ["topics", t, "rate"] => Ok(Route::Rate { topic: topic(t)? }),
            ["guidelines", t, r] => Ok(Route::Guidelines {
                topic: topic(t)?,
                rating: rating(r)?,
            }),
            ["quiz", t, r] => Ok(Route::Quiz {
                topic: topic(t)?,
                rating: rating(r)?,
            }),
            ["results"] => Ok(Route::Results),
            _ => Err(err()),
        }
    }
}
