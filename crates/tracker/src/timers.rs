//! Deadline and progress-interval handles owned by one tracking call.

use std::future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Sleep};

/// Shortest progress period; `interval_at` rejects zero.
const MIN_PROGRESS_PERIOD: Duration = Duration::from_millis(1);

/// An overall deadline plus a periodic progress task.
///
/// Each tracking call owns its own `TimerSet`. [`clear`](Self::clear)
/// releases both handles and is safe to call any number of times; dropping
/// the set clears it as well, so no exit path leaves a progress task running.
#[derive(Debug, Default)]
pub struct TimerSet {
    deadline: Option<Pin<Box<Sleep>>>,
    progress: Option<JoinHandle<()>>,
}

impl TimerSet {
    /// Create an empty timer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the deadline to fire `after` from now, replacing any armed one.
    pub fn arm_deadline(&mut self, after: Duration) {
        self.deadline = Some(Box::pin(time::sleep(after)));
    }

    /// Run `tick` every `period`, first one `period` from now.
    ///
    /// Replaces (and aborts) any progress task already running. A zero period
    /// is raised to one millisecond.
    pub fn start_progress<F>(&mut self, period: Duration, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if let Some(previous) = self.progress.take() {
            previous.abort();
        }

        let period = period.max(MIN_PROGRESS_PERIOD);
        let mut interval = time::interval_at(Instant::now() + period, period);
        self.progress = Some(tokio::spawn(async move {
            loop {
                interval.tick().await;
                tick();
            }
        }));
    }

    /// Resolve once the deadline fires. Pending forever if none is armed.
    pub async fn deadline_elapsed(&mut self) {
        match self.deadline.as_mut() {
            Some(sleep) => sleep.as_mut().await,
            None => future::pending().await,
        }
    }

    /// Release the deadline and stop the progress task.
    ///
    /// Returns `true` if anything was still held.
    pub fn clear(&mut self) -> bool {
        let had_deadline = self.deadline.take().is_some();
        let had_progress = match self.progress.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        };
        had_deadline || had_progress
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn has_progress(&self) -> bool {
        self.progress.is_some()
    }

    /// Whether nothing is held.
    pub fn is_clear(&self) -> bool {
        !self.has_deadline() && !self.has_progress()
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_tick() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        (ticks, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires_after_duration() {
        let mut timers = TimerSet::new();
        let start = Instant::now();
        timers.arm_deadline(Duration::from_secs(60));

        timers.deadline_elapsed().await;
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unarmed_deadline_never_fires() {
        let mut timers = TimerSet::new();
        let fired = time::timeout(Duration::from_secs(3600), timers.deadline_elapsed()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_progress_period_is_clamped() {
        let mut timers = TimerSet::new();
        let (ticks, tick) = counting_tick();
        timers.start_progress(Duration::ZERO, tick);

        time::sleep(Duration::from_millis(10)).await;
        assert!(ticks.load(Ordering::SeqCst) >= 1);
        assert!(timers.clear());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_ticks_until_cleared() {
        let mut timers = TimerSet::new();
        let (ticks, tick) = counting_tick();
        timers.start_progress(Duration::from_secs(5), tick);

        time::sleep(Duration::from_millis(12_500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        timers.clear();
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_progress_replaces_previous() {
        let mut timers = TimerSet::new();
        let (first, tick) = counting_tick();
        timers.start_progress(Duration::from_secs(5), tick);
        let (second, tick) = counting_tick();
        timers.start_progress(Duration::from_secs(5), tick);

        time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_is_idempotent() {
        let mut timers = TimerSet::new();
        assert!(!timers.clear());

        timers.arm_deadline(Duration::from_secs(1));
        timers.start_progress(Duration::from_secs(1), || {});
        assert!(!timers.is_clear());

        assert!(timers.clear());
        assert!(!timers.clear());
        assert!(timers.is_clear());
    }
}
