//! Repeating refresh timer.
//!
//! `RefreshScheduler` is either idle or running. Running is represented by a
//! [`TimerGuard`]: dropping the guard (on `stop`, on restart, or when the
//! scheduler itself goes away) ends the timer task, so no exit path can leave
//! a timer behind.
//!
//! A tick that is already executing when the guard is dropped runs to
//! completion; the timer just never fires again afterwards.

use std::future::Future;
use std::time::Duration;

use log::{debug, error};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Keeps a timer task alive; dropping it stops the task.
struct TimerGuard {
    _stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Two-state refresh timer, reusable across any number of start/stop cycles.
#[derive(Default)]
pub struct RefreshScheduler {
    running: Option<TimerGuard>,
}

impl RefreshScheduler {
    /// Idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_tick` now and then every `period`, replacing any running timer.
    ///
    /// Ticks are measured from the immediate call. Ticks missed while a slow
    /// `on_tick` runs are skipped, never replayed in a burst. Must be
    /// called from inside a Tokio runtime; otherwise the scheduler logs and
    /// stays idle.
    pub fn start<F, Fut>(&mut self, period: Duration, on_tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("Cannot start refresh timer: {e}");
                return;
            }
        };
        let period = period.max(Duration::from_millis(1));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = handle.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => on_tick().await,
                }
            }
            debug!("Refresh timer stopped");
        });

        debug!("Refresh timer armed every {:?}", period);
        self.running = Some(TimerGuard {
            _stop: stop_tx,
            task,
        });
    }

    /// Cancel the timer; does nothing when idle.
    pub fn stop(&mut self) {
        self.running = None;
    }

    /// True while a timer is armed.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|guard| !guard.task.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counting(counter: Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + 'static {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    fn count(counter: &Arc<AtomicUsize>) -> usize {
        counter.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_then_every_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(Duration::from_secs(10), counting(ticks.clone()));
        assert!(scheduler.is_running());

        sleep(Duration::from_millis(1)).await;
        assert_eq!(count(&ticks), 1);

        sleep(Duration::from_secs(9)).await;
        assert_eq!(count(&ticks), 1);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(count(&ticks), 2);

        sleep(Duration::from_secs(20)).await;
        assert_eq!(count(&ticks), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(Duration::from_secs(10), counting(ticks.clone()));
        sleep(Duration::from_millis(1)).await;

        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());

        sleep(Duration::from_secs(100)).await;
        assert_eq!(count(&ticks), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_old_timer() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(Duration::from_secs(10), counting(ticks.clone()));
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count(&ticks), 1);

        scheduler.start(Duration::from_secs(10), counting(ticks.clone()));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(count(&ticks), 2);

        // The first timer would have fired at t=10s.
        sleep(Duration::from_secs(7)).await;
        assert_eq!(count(&ticks), 2);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(count(&ticks), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_tick_completes_after_stop() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        {
            let (started, finished) = (started.clone(), finished.clone());
            scheduler.start(Duration::from_secs(10), move || {
                let (started, finished) = (started.clone(), finished.clone());
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_secs(3)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        sleep(Duration::from_millis(1)).await;
        assert_eq!(count(&started), 1);

        scheduler.stop();
        sleep(Duration::from_secs(60)).await;
        assert_eq!(count(&started), 1);
        assert_eq!(count(&finished), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_stops_the_timer() {
        let ticks = Arc::new(AtomicUsize::new(0));
        {
            let mut scheduler = RefreshScheduler::new();
            scheduler.start(Duration::from_secs(10), counting(ticks.clone()));
            sleep(Duration::from_millis(1)).await;
        }
        sleep(Duration::from_secs(60)).await;
        assert_eq!(count(&ticks), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_is_reusable() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        for _ in 0..3 {
            scheduler.start(Duration::from_secs(10), counting(ticks.clone()));
            sleep(Duration::from_millis(1)).await;
            scheduler.stop();
        }
        sleep(Duration::from_secs(60)).await;
        assert_eq!(count(&ticks), 3);
        assert!(!scheduler.is_running());
    }
}
