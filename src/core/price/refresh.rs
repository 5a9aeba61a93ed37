use crate::core::price::fetcher::PriceFetcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Fetches once right away, then on every interval tick or manual trigger.
pub struct PriceTicker {
    fetcher: Arc<PriceFetcher>,
    interval: Duration,
}

/// Dropping the handle closes the shutdown channel, which ends the loop like [`TickerHandle::stop`]
/// without waiting for it.
pub struct TickerHandle {
    trigger: Arc<Notify>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PriceTicker {
    pub fn new(fetcher: Arc<PriceFetcher>, interval: Duration) -> Self {
        Self {
            fetcher,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn spawn(self) -> TickerHandle {
        let trigger = Arc::new(Notify::new());
        let (shutdown, mut stop) = oneshot::channel();
        let manual = Arc::clone(&trigger);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("🔄 Refreshing price every {:?}", self.interval);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop => break,
                    _ = manual.notified() => tracing::debug!("Manual price refresh"),
                    _ = ticker.tick() => tracing::debug!("Scheduled price refresh"),
                }
                self.fetcher.fetch_price().await;
            }

            tracing::debug!("Price ticker stopped");
        });

        TickerHandle {
            trigger,
            shutdown,
            task,
        }
    }
}

impl TickerHandle {
    /// Queues one extra fetch. Triggers while a fetch is running collapse into one.
    pub fn refresh_now(&self) {
        self.trigger.notify_one();
    }

    /// Waits for an in-flight fetch to finish; nothing is aborted.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::warn!("Price ticker task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::store::PriceStore;
    use crate::domain::model::Price;
    use crate::domain::ports::PriceSource;
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_price(&self, _client: &reqwest::Client) -> Result<Price> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Price::new(40_000.0 + n as f64).expect("positive"))
        }
    }

    fn setup() -> (Arc<CountingSource>, Arc<PriceStore>, Arc<PriceFetcher>) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(PriceStore::new());
        let fetcher = Arc::new(PriceFetcher::new(
            vec![source.clone() as Arc<dyn PriceSource>],
            store.clone(),
        ));
        (source, store, fetcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let (source, store, fetcher) = setup();
        let handle = PriceTicker::new(fetcher, DEFAULT_REFRESH_INTERVAL).spawn();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.current_price().unwrap().eur_per_btc(), 40_001.0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.current_price().unwrap().eur_per_btc(), 40_002.0);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_runs_out_of_band() {
        let (source, _store, fetcher) = setup();
        let handle = PriceTicker::new(fetcher, DEFAULT_REFRESH_INTERVAL).spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;

        handle.refresh_now();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_refreshing() {
        let (source, _store, fetcher) = setup();
        let handle = PriceTicker::new(fetcher, Duration::from_secs(5)).spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;

        handle.stop().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_ends_refreshing() {
        let (source, _store, fetcher) = setup();
        let handle = PriceTicker::new(fetcher.clone(), Duration::from_secs(5)).spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;

        drop(handle);
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        // 迴圈結束後 task 釋放了它持有的 fetcher
        assert_eq!(Arc::strong_count(&fetcher), 1);
    }
}
