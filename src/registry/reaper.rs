//! Liveness Reaper
//!
//! Background task that periodically sweeps expired records out of the store.
//! A sweep only touches in-memory state, so it is bounded by the store's lock
//! and never waits on I/O.

use super::store::RegistryStore;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default period between sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Roughly thirty years; stands in for "never" when `now + period` overflows
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// First tick of a recurring task with `period`, saturating instead of panicking.
pub(crate) fn first_tick_after(period: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(period)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

pub struct Reaper {
    store: Arc<RegistryStore>,
    period: Duration,
    running: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Reaper {
    pub fn new(store: Arc<RegistryStore>, period: Duration) -> Self {
        Self {
            store,
            period,
            running: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(Notify::new()),
            handle: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    /// Spawn the sweep loop on the current tokio runtime. Starting twice is a no-op.
    pub fn start(&self) {
        let mut running = self.running.write();
        if *running {
            return;
        }
        *running = true;
        drop(running);

        let store = Arc::clone(&self.store);
        let running = Arc::clone(&self.running);
        let shutdown = Arc::clone(&self.shutdown);
        let period = self.period;

        let handle = tokio::spawn(async move {
            Self::sweep_loop(store, period, running, shutdown).await;
        });
        *self.handle.lock() = Some(handle);

        info!(period_ms = period.as_millis() as u64, "Started liveness reaper");
    }

    /// Signal the loop to exit and wait for it
    pub async fn stop(&self) {
        {
            let mut running = self.running.write();
            if !*running {
                return;
            }
            *running = false;
        }
        self.shutdown.notify_one();

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        info!("Stopped liveness reaper");
    }

    async fn sweep_loop(
        store: Arc<RegistryStore>,
        period: Duration,
        running: Arc<RwLock<bool>>,
        shutdown: Arc<Notify>,
    ) {
        let mut ticker = interval_at(first_tick_after(period), period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while *running.read() {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.sweep_expired();
                    if removed > 0 {
                        info!(
                            removed,
                            remaining = store.physical_count(),
                            "Swept expired agents"
                        );
                    } else {
                        debug!("Sweep found no expired agents");
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}
