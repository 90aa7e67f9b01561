use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::Notify;

/// Cooperative stop handle shared by every relay loop. Cleared exactly once
/// on shutdown; checked at the top of each loop iteration and selected on
/// at every blocking point.
pub struct RunFlag {
    running: AtomicBool,
    notify: Notify,
}

impl RunFlag {
    pub fn new() -> Self {
        RunFlag {
            running: AtomicBool::new(true),
            notify: Notify::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clears the flag and wakes everything waiting on it. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Completes once the flag has been cleared.
    pub async fn cancelled(&self) {
        loop {
            let stopped = self.notify.notified();
            tokio::pin!(stopped);
            // Register with the notifier before reading the flag, so a
            // concurrent stop() cannot slip between the check and the await.
            stopped.as_mut().enable();

            if !self.is_running() {
                return;
            }
            stopped.await;
        }
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Starting,
    Acquiring,
    Relaying,
    Stopping,
}

impl Display for ServiceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::Stopped => write!(f, "Stopped"),
            ServiceState::Starting => write!(f, "Starting"),
            ServiceState::Acquiring => write!(f, "Acquiring"),
            ServiceState::Relaying => write!(f, "Relaying"),
            ServiceState::Stopping => write!(f, "Stopping"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct RelayStatus {
    pub state: ServiceState,
    pub sessions: u64,
    pub channel: u8,
    pub port: u16,
    pub uptime_secs: u64,
}

/// Both live endpoints of one relay phase. Built fresh each acquisition,
/// consumed by exactly one forwarding session, never reused.
pub struct EndpointPair<R, L> {
    pub remote: R,
    pub local: L,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    #[tokio::test]
    async fn stop_is_idempotent_and_wakes_waiters() {
        let run = Arc::new(RunFlag::new());
        assert!(run.is_running());

        let waiter = tokio::spawn({
            let run = run.clone();
            async move { run.cancelled().await }
        });

        run.stop();
        run.stop();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(!run.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_from_another_thread_always_lands() {
        for _ in 0..500 {
            let run = Arc::new(RunFlag::new());

            let waiter = tokio::spawn({
                let run = run.clone();
                async move { run.cancelled().await }
            });
            let stopper = tokio::spawn({
                let run = run.clone();
                async move { run.stop() }
            });

            tokio::time::timeout(Duration::from_secs(5), async {
                waiter.await.unwrap();
                stopper.await.unwrap();
            })
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn cancelled_completes_immediately_when_already_stopped() {
        let run = RunFlag::new();
        run.stop();
        run.cancelled().await;
    }
}
