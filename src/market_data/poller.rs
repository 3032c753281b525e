// Periodic driver: refreshes the cache on a fixed interval until stopped
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::market_data::price_cache::PriceCache;

pub struct PricePoller {
    cache: Arc<PriceCache>,
    interval: Duration,
}

/// Returned by `PricePoller::start`. Only `stop` ends the loop; dropping the
/// handle leaves the poller running for the life of the runtime.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PricePoller {
    pub fn new(cache: Arc<PriceCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// First refresh fires immediately, then every `interval` from start.
    /// Each tick refreshes on its own task so a slow upstream never holds
    /// back the next tick.
    pub fn start(self) -> PollerHandle {
        let (shutdown, mut stop_rx) = watch::channel(false);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut initial = true;
            let mut stoppable = true;

            loop {
                tokio::select! {
                    biased;
                    changed = stop_rx.changed(), if stoppable => match changed {
                        Ok(()) => break,
                        Err(_) => {
                            debug!("poller handle dropped, polling continues");
                            stoppable = false;
                        }
                    },
                    _ = ticker.tick() => {
                        let cache = Arc::clone(&self.cache);
                        tokio::spawn(refresh_once(cache, initial));
                        initial = false;
                    }
                }
            }
            info!("Price updates stopped");
        });

        info!(interval_ms = interval.as_millis() as u64, "Price updates started");
        PollerHandle { shutdown, task }
    }
}

async fn refresh_once(cache: Arc<PriceCache>, initial: bool) {
    match cache.refresh().await {
        Ok(snap) => debug!(mid = %snap.mid_price, ts = snap.timestamp, "Price updated"),
        Err(e) if initial => warn!(kind = e.kind().as_str(), error = %e, "Initial price fetch failed"),
        Err(e) => warn!(kind = e.kind().as_str(), error = %e, "Price update failed"),
    }
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop scheduling ticks. In-flight refreshes are not waited on; the
    /// returned handle resolves once the scheduling loop has exited.
    #[must_use = "await the handle to wait for the loop, or drop it"]
    pub fn stop(self) -> JoinHandle<()> {
        let _ = self.shutdown.send(true);
        self.task
    }
}
