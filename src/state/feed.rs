//! Periodic regeneration of the order collection
//!
//! A [`LiveFeed`] owns a background task that fetches a fresh batch from an
//! [`OrderSource`] on every tick and installs it into the dashboard state.
//! The first fetch happens immediately. The task holds only a weak reference
//! to the state and exits on its own once the owner is gone.

use super::Shared;
use crate::core::source::OrderSource;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a running live feed
///
/// Dropping the handle cancels the task; [`LiveFeed::stop`] shuts it down and
/// waits for it to finish.
pub struct LiveFeed {
    shutdown: Option<oneshot::Sender<()>>,
    refresh: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl LiveFeed {
    /// Must be called from within a tokio runtime
    pub(crate) fn spawn(
        state: Weak<Shared>,
        source: Arc<dyn OrderSource>,
        period: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        // one pending request is enough, extra ones coalesce
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        let handle = tokio::spawn(run_feed(state, source, period, shutdown_rx, refresh_rx));

        Self {
            shutdown: Some(shutdown_tx),
            refresh: refresh_tx,
            handle: Some(handle),
        }
    }

    /// Request a fetch now instead of waiting for the next tick
    ///
    /// The regular schedule restarts from the manual fetch. Returns false if
    /// the feed has stopped or a request is already pending.
    pub fn refresh_now(&self) -> bool {
        self.refresh.try_send(()).is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the feed and wait for the task to exit
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // Err means the task already exited
            let _ = shutdown.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Live feed task failed");
            }
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_feed(
    state: Weak<Shared>,
    source: Arc<dyn OrderSource>,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
    mut refresh: mpsc::Receiver<()>,
) {
    let period = period.max(MIN_PERIOD);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(period_ms = period.as_millis() as u64, "Live feed started");

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Live feed stopping");
                return;
            }
            _ = ticker.tick() => {}
            Some(()) = refresh.recv() => {
                tracing::debug!("Manual refresh requested");
                ticker.reset();
            }
        }

        if state.strong_count() == 0 {
            break;
        }

        let fetched = tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Live feed stopping during fetch");
                return;
            }
            result = source.fetch() => result,
        };

        let orders = match fetched {
            Ok(orders) => orders,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch orders, keeping previous batch");
                continue;
            }
        };

        let Some(shared) = state.upgrade() else {
            break;
        };

        match shared.replace_orders(orders) {
            Ok(generation) => tracing::debug!(generation = generation, "Installed new order batch"),
            Err(e) => tracing::warn!(error = %e, "Failed to install order batch"),
        }
    }

    tracing::info!("Dashboard state dropped, live feed exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::{OrderGenerator, RegionDistribution};
    use crate::core::order::Order;
    use crate::core::source::MockOrderSource;
    use crate::state::DashboardState;
    use async_trait::async_trait;

    const PERIOD: Duration = Duration::from_secs(30);

    fn source() -> Arc<dyn OrderSource> {
        Arc::new(MockOrderSource::seeded(
            OrderGenerator::new().with_distribution(RegionDistribution::Uniform { count: 5 }),
            11,
        ))
    }

    fn generation(state: &DashboardState) -> u64 {
        state.snapshot().unwrap().generation
    }

    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    struct FailingSource;

    #[async_trait]
    impl OrderSource for FailingSource {
        async fn fetch(&self) -> anyhow::Result<Vec<Order>> {
            Err(anyhow::anyhow!("upstream unavailable"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let state = DashboardState::default();
        let feed = state.start_live_feed(source(), PERIOD);

        advance(Duration::from_millis(1)).await;
        assert_eq!(generation(&state), 1);
        assert_eq!(state.snapshot().unwrap().total_orders, 5);

        feed.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerates_every_period() {
        let state = DashboardState::default();
        let feed = state.start_live_feed(source(), PERIOD);

        advance(Duration::from_secs(31)).await;
        assert_eq!(generation(&state), 2);

        advance(Duration::from_secs(30)).await;
        assert_eq!(generation(&state), 3);

        feed.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_updates() {
        let state = DashboardState::default();
        let feed = state.start_live_feed(source(), PERIOD);
        advance(Duration::from_millis(1)).await;

        feed.stop().await;
        advance(Duration::from_secs(120)).await;

        assert_eq!(generation(&state), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let state = DashboardState::default();
        let feed = state.start_live_feed(source(), PERIOD);
        advance(Duration::from_millis(1)).await;

        drop(feed);
        advance(Duration::from_secs(120)).await;

        assert_eq!(generation(&state), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_when_owner_dropped() {
        let state = DashboardState::default();
        let feed = state.start_live_feed(source(), PERIOD);
        advance(Duration::from_millis(1)).await;
        assert!(feed.is_running());

        drop(state);
        advance(Duration::from_secs(31)).await;

        assert!(!feed.is_running());
        assert!(!feed.refresh_now());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_fetches_and_restarts_schedule() {
        let state = DashboardState::default();
        let feed = state.start_live_feed(source(), PERIOD);
        advance(Duration::from_secs(10)).await;
        assert_eq!(generation(&state), 1);

        assert!(feed.refresh_now());
        advance(Duration::from_millis(1)).await;
        assert_eq!(generation(&state), 2);

        // the tick at 30s was pushed back to 40s
        advance(Duration::from_secs(25)).await;
        assert_eq!(generation(&state), 2);
        advance(Duration::from_secs(6)).await;
        assert_eq!(generation(&state), 3);

        feed.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_errors_keep_previous_batch() {
        let state = DashboardState::default();
        let feed = state.start_live_feed(Arc::new(FailingSource), PERIOD);

        advance(Duration::from_secs(61)).await;

        assert_eq!(generation(&state), 0);
        assert!(feed.is_running());
        feed.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_slow_fetch() {
        let state = DashboardState::default();
        let slow = MockOrderSource::default().with_latency(Duration::from_secs(10));
        let feed = state.start_live_feed(Arc::new(slow), PERIOD);
        advance(Duration::from_millis(1)).await;

        feed.stop().await;

        assert_eq!(generation(&state), 0);
    }
}
