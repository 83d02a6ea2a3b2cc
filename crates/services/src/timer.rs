//! Single-shot countdown on the tokio runtime.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owner of a running countdown. Cancelling or dropping it stops the task
/// before any further callback fires.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct Countdown;

impl Countdown {
    /// Start counting down `ticks` periods.
    ///
    /// `on_tick` receives the remaining count after each period;
    /// `on_expire` runs once, right after the tick that reaches zero. With
    /// `ticks == 0` only `on_expire` runs, immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<T, E>(ticks: u32, period: Duration, mut on_tick: T, on_expire: E) -> TimerHandle
    where
        T: FnMut(u32) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut remaining = ticks;
            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                on_tick(remaining);
            }
            on_expire();
        });
        TimerHandle { task }
    }
}
