use serde::{Deserialize, Serialize};
use std::fmt;

/// Integrity events observed while a quiz is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Tab switch, window minimize or any other loss of focus.
    FocusLost,
    FullscreenExited,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::FocusLost => f.write_str("focus lost"),
            ViolationKind::FullscreenExited => f.write_str("fullscreen exited"),
        }
    }
}

/// Monotonic violation counter with an abandonment threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationTracker {
    count: u32,
    limit: u32,
}

impl ViolationTracker {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    #[must_use]
    pub fn from_persisted(count: u32, limit: u32) -> Self {
        Self { count, limit }
    }

    /// Count one violation and return the new total.
    pub fn record(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        self.count >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_reached_on_the_limit() {
        let mut tracker = ViolationTracker::new(3);
        tracker.record();
        tracker.record();
        assert!(!tracker.is_exceeded());
        assert_eq!(tracker.remaining(), 1);
        assert_eq!(tracker.record(), 3);
        assert!(tracker.is_exceeded());
    }
}
