use std::fmt;

/// Fixed keys of the per-user durable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Authenticated,
    GuidelinesAccepted,
    QuizProgress,
    LastResults,
}

impl StorageKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Authenticated => "isAuthenticated",
            StorageKey::GuidelinesAccepted => "guidelinesAccepted",
            StorageKey::QuizProgress => "quizProgress",
            StorageKey::LastResults => "quizResults",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
