use crate::relay::types::RunFlag;

use std::{future::Future, sync::Mutex, time::Duration};
use tokio::{sync::Notify, time::Instant};

#[derive(Clone, Copy, Debug)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub multiplier: f64,
    pub max: Duration,
}

/// Outcome of a single attempt inside a backoff loop.
pub enum Attempt<T> {
    Continue,
    Finish(T),
}

struct BackoffState {
    current: Duration,
    deadline: Option<Instant>,
}

/// Exponentially growing retry delay, shared between the loop that sleeps
/// on it and anything that wants to cut the sleep short.
pub struct Backoff {
    config: BackoffConfig,
    state: Mutex<BackoffState>,
    wake: Notify,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Backoff {
            config,
            state: Mutex::new(BackoffState {
                current: config.initial,
                deadline: None,
            }),
            wake: Notify::new(),
        }
    }

    /// Arms the next sleep deadline and grows the stored delay, capped at
    /// the configured maximum. Returns the delay that was armed.
    pub fn next_delay(&self) -> Duration {
        let mut state = self.state.lock().unwrap();
        let delay = state.current;
        state.deadline = Some(Instant::now() + delay);

        let grown = (state.current.as_millis() as f64 * self.config.multiplier).ceil() as u64;
        state.current = Duration::from_millis(grown).min(self.config.max);

        delay
    }

    /// Restores the initial delay, disarms any pending deadline and wakes a
    /// sleeping loop so its next attempt happens right away. Callable from
    /// any task.
    pub fn reset(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.current = self.config.initial;
            state.deadline = None;
        }
        self.wake.notify_waiters();
    }

    /// Sleeps until the armed deadline passes, a reset disarms it, or the
    /// run flag clears.
    async fn wait(&self, run: &RunFlag) {
        loop {
            let woken = self.wake.notified();
            tokio::pin!(woken);
            // Register with the notifier before reading the deadline, so a
            // concurrent reset() cannot slip between the read and the sleep.
            woken.as_mut().enable();

            let deadline = match self.state.lock().unwrap().deadline {
                Some(deadline) if run.is_running() => deadline,
                _ => return,
            };

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    self.state.lock().unwrap().deadline = None;
                    return;
                }
                _ = &mut woken => {}
                _ = run.cancelled() => return,
            }
        }
    }
}

/// Repeats `attempt` until it reports `Finish` or the run flag clears,
/// sleeping on `backoff` between failed attempts. The first attempt runs
/// immediately; the flag is re-checked after every sleep and the attempt is
/// never called again once it clears.
pub async fn run_backoff_loop<T, F, Fut>(
    backoff: &Backoff,
    run: &RunFlag,
    mut attempt: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut sleep_first = false;

    while run.is_running() {
        if sleep_first {
            let delay = backoff.next_delay();
            log::debug!("Next attempt in {delay:?}");
            backoff.wait(run).await;

            if !run.is_running() {
                break;
            }
        }

        let result = tokio::select! {
            result = attempt() => result,
            _ = run.cancelled() => break,
        };

        match result {
            Attempt::Continue => sleep_first = true,
            Attempt::Finish(value) => return Some(value),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn config_ms(initial: u64, multiplier: f64, max: u64) -> BackoffConfig {
        BackoffConfig {
            initial: Duration::from_millis(initial),
            multiplier,
            max: Duration::from_millis(max),
        }
    }

    fn spinning_loop(
        backoff: &Arc<Backoff>,
        run: &Arc<RunFlag>,
        attempts: &Arc<AtomicUsize>,
    ) -> tokio::task::JoinHandle<Option<()>> {
        let backoff = backoff.clone();
        let run = run.clone();
        let attempts = attempts.clone();
        tokio::spawn(async move {
            run_backoff_loop(&backoff, &run, move || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Attempt::<()>::Continue }
            })
            .await
        })
    }

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let backoff = Backoff::new(config_ms(1000, 2.0, 60_000));

        let delays: Vec<u64> = (0..8)
            .map(|_| backoff.next_delay().as_millis() as u64)
            .collect();

        assert_eq!(
            delays,
            vec![1000, 2000, 4000, 8000, 16000, 32000, 60000, 60000]
        );
    }

    #[test]
    fn fractional_multiplier_rounds_up() {
        let backoff = Backoff::new(config_ms(10, 1.5, 1000));

        let delays: Vec<u64> = (0..4)
            .map(|_| backoff.next_delay().as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![10, 15, 23, 35]);
    }

    #[test]
    fn reset_restores_initial_delay() {
        let backoff = Backoff::new(config_ms(1000, 2.0, 60_000));

        for _ in 0..4 {
            backoff.next_delay();
        }
        backoff.reset();

        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn finish_stops_the_loop() {
        let run = RunFlag::new();
        let backoff = Backoff::new(config_ms(1000, 2.0, 60_000));
        let attempts = AtomicUsize::new(0);

        let result = run_backoff_loop(&backoff, &run, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Attempt::Continue
                } else {
                    Attempt::Finish(n)
                }
            }
        })
        .await;

        assert_eq!(result, Some(3));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_sleep_skips_further_attempts() {
        let run = Arc::new(RunFlag::new());
        let backoff = Arc::new(Backoff::new(config_ms(60_000, 2.0, 600_000)));
        let attempts = Arc::new(AtomicUsize::new(0));

        let loop_task = spinning_loop(&backoff, &run, &attempts);

        tokio::time::sleep(Duration::from_millis(10)).await;
        run.stop();

        assert_eq!(loop_task.await.unwrap(), None);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reset_from_another_thread_always_wakes_the_sleeper() {
        let run = Arc::new(RunFlag::new());

        for _ in 0..200 {
            let backoff = Arc::new(Backoff::new(config_ms(60_000, 2.0, 600_000)));
            backoff.next_delay();

            let sleeper = tokio::spawn({
                let backoff = backoff.clone();
                let run = run.clone();
                async move { backoff.wait(&run).await }
            });
            let resetter = tokio::spawn({
                let backoff = backoff.clone();
                async move { backoff.reset() }
            });

            tokio::time::timeout(Duration::from_secs(5), async {
                sleeper.await.unwrap();
                resetter.await.unwrap();
            })
            .await
            .unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reset_wakes_a_sleeping_loop() {
        let run = Arc::new(RunFlag::new());
        let backoff = Arc::new(Backoff::new(config_ms(60_000, 2.0, 600_000)));
        let attempts = Arc::new(AtomicUsize::new(0));

        let loop_task = spinning_loop(&backoff, &run, &attempts);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        backoff.reset();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        run.stop();
        assert_eq!(loop_task.await.unwrap(), None);
    }
}
