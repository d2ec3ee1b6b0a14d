use serde::{Deserialize, Serialize};

/// Per-question countdown measured in whole seconds.
///
/// The timer itself never schedules anything; callers feed it elapsed seconds
/// via [`QuestionTimer::tick`] and react to [`TimerStatus::Expired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTimer {
    duration_secs: u32,
    remaining_secs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running { remaining_secs: u32 },
    Expired,
}

impl QuestionTimer {
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
        }
    }

    /// Restore a timer mid-countdown. Returns `None` if `remaining_secs`
    /// exceeds `duration_secs`.
    #[must_use]
    pub fn from_persisted(duration_secs: u32, remaining_secs: u32) -> Option<Self> {
        (remaining_secs <= duration_secs).then_some(Self {
            duration_secs,
            remaining_secs,
        })
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.duration_secs - self.remaining_secs
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn tick(&mut self, secs: u32) -> TimerStatus {
        self.remaining_secs = self.remaining_secs.saturating_sub(secs);
        if self.is_expired() {
            TimerStatus::Expired
        } else {
            TimerStatus::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
    }
}
