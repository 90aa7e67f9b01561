use super::{
    acquire::acquire,
    forward::relay_session,
    transport::Transport,
    types::{RelayStatus, RunFlag, ServiceState},
    ACQUIRE_INITIAL_MS, ACQUIRE_MAX_MS, ACQUIRE_MULTIPLIER,
};
use crate::backoff::{Backoff, BackoffConfig};

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

/// Relay lifecycle: Acquiring and Relaying alternate until shutdown.
/// Endpoints live for exactly one relay phase; a failed session sends the
/// service back to acquisition with fresh backoffs.
pub struct RelayService<T: Transport> {
    transport: T,
    run: Arc<RunFlag>,
    remote_backoff: Arc<Backoff>,
    local_backoff: Arc<Backoff>,
    state: Mutex<ServiceState>,
    sessions: AtomicU64,
    started_at: Instant,
    channel: u8,
    port: u16,
}

impl<T: Transport> RelayService<T> {
    pub fn new(transport: T, channel: u8, port: u16) -> Self {
        let config = BackoffConfig {
            initial: Duration::from_millis(ACQUIRE_INITIAL_MS),
            multiplier: ACQUIRE_MULTIPLIER,
            max: Duration::from_millis(ACQUIRE_MAX_MS),
        };

        RelayService {
            transport,
            run: Arc::new(RunFlag::new()),
            remote_backoff: Arc::new(Backoff::new(config)),
            local_backoff: Arc::new(Backoff::new(config)),
            state: Mutex::new(ServiceState::Starting),
            sessions: AtomicU64::new(0),
            started_at: Instant::now(),
            channel,
            port,
        }
    }

    pub async fn run(&self) {
        while self.run.is_running() {
            self.set_state(ServiceState::Acquiring);
            self.remote_backoff.reset();
            self.local_backoff.reset();

            let Some(pair) = acquire(
                &self.transport,
                &self.run,
                &self.remote_backoff,
                &self.local_backoff,
            )
            .await
            else {
                break;
            };

            if !self.run.is_running() {
                break;
            }

            self.set_state(ServiceState::Relaying);
            relay_session(pair, &self.run).await;
            self.sessions.fetch_add(1, Ordering::SeqCst);
        }

        self.set_state(ServiceState::Stopped);
        log::info!("Relay service stopped");
    }

    /// Requests shutdown. Safe to call any number of times, in any state.
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state != ServiceState::Stopped {
                *state = ServiceState::Stopping;
            }
        }
        self.run.stop();
    }

    /// Connectivity hint: a peer just appeared on the link layer, so any
    /// pending acquisition delay is cut short.
    pub fn hint_peer_connected(&self) {
        self.remote_backoff.reset();
        self.local_backoff.reset();
    }

    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    pub fn run_flag(&self) -> Arc<RunFlag> {
        self.run.clone()
    }

    pub fn status(&self) -> RelayStatus {
        RelayStatus {
            state: *self.state.lock().unwrap(),
            sessions: self.sessions.load(Ordering::SeqCst),
            channel: self.channel,
            port: self.port,
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    fn set_state(&self, state: ServiceState) {
        *self.state.lock().unwrap() = state;
        log::debug!("Service state: {state}");
    }
}
