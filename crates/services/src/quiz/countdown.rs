use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

const TICK: Duration = Duration::from_secs(1);

/// The single per-question countdown task.
///
/// Every `restart` aborts the previous task and opens a fresh channel, so a
/// tick scheduled for an earlier question can never reach the current one.
#[derive(Debug, Default)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
    ticks: Option<mpsc::Receiver<u32>>,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from a full second away.
    pub fn restart(&mut self) {
        self.stop();
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(1).await.is_err() {
                    break;
                }
            }
        });
        self.handle = Some(handle);
        self.ticks = Some(rx);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.ticks = None;
    }

    /// Wait for the next tick. Pending forever while stopped.
    pub async fn next_tick(&mut self) -> Option<u32> {
        match self.ticks.as_mut() {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_after_restart() {
        let mut countdown = Countdown::new();
        countdown.restart();
        let started = Instant::now();

        assert_eq!(countdown.next_tick().await, Some(1));
        assert_eq!(started.elapsed(), TICK);
        assert_eq!(countdown.next_tick().await, Some(1));
        assert_eq!(started.elapsed(), TICK * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_discards_the_previous_schedule() {
        let mut countdown = Countdown::new();
        countdown.restart();
        tokio::time::sleep(Duration::from_millis(900)).await;

        countdown.restart();
        let restarted = Instant::now();
        countdown.next_tick().await;
        assert_eq!(restarted.elapsed(), TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_countdown_never_ticks() {
        let mut countdown = Countdown::new();
        countdown.restart();
        countdown.stop();
        assert!(countdown.handle.is_none());

        let waited = tokio::time::timeout(Duration::from_secs(5), countdown.next_tick()).await;
        assert!(waited.is_err());
    }
}
