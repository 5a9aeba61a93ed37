use crate::adapters::http::JsonPointerSource;
use crate::config::PriceConfig;
use crate::core::price::store::PriceStore;
use crate::domain::model::{FetchOutcome, PriceSnapshot};
use crate::domain::ports::PriceSource;
use crate::utils::error::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Walks the configured sources in priority order and keeps the first usable price.
pub struct PriceFetcher {
    sources: Vec<Arc<dyn PriceSource>>,
    store: Arc<PriceStore>,
    client: Client,
}

impl PriceFetcher {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>, store: Arc<PriceStore>) -> Self {
        Self {
            sources,
            store,
            client: Client::new(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn from_config(config: &PriceConfig, store: Arc<PriceStore>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build()?;

        let sources = config
            .sources
            .iter()
            .map(|source| Arc::new(JsonPointerSource::from_config(source)) as Arc<dyn PriceSource>)
            .collect();

        Ok(Self::new(sources, store).with_client(client))
    }

    pub fn store(&self) -> &Arc<PriceStore> {
        &self.store
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Never fails: per-source errors are logged and skipped, total failure is
    /// reported as [`FetchOutcome::Failure`] and leaves the stored price alone.
    pub async fn fetch_price(&self) -> FetchOutcome {
        self.store.begin_fetch();

        for (index, source) in self.sources.iter().enumerate() {
            tracing::debug!(
                "📡 Trying source {}/{}: {}",
                index + 1,
                self.sources.len(),
                source.name()
            );

            match source.fetch_price(&self.client).await {
                Ok(price) => {
                    tracing::info!("💶 {} from {}", price, source.name());
                    self.store
                        .set_current_and_notify(PriceSnapshot::new(price, source.name()));
                    return FetchOutcome::Success {
                        price,
                        source: source.name().to_string(),
                    };
                }
                Err(e) => {
                    tracing::warn!("⚠️  {}", e);
                }
            }
        }

        tracing::error!(
            "❌ No price available: all {} sources failed",
            self.sources.len()
        );
        self.store.mark_unavailable();
        FetchOutcome::Failure {
            attempted: self.sources.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Price, PriceStatus};
    use crate::utils::error::SiteError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        name: String,
        price: Option<f64>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(name: &str, price: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                price,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for FakeSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_price(&self, _client: &Client) -> Result<Price> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.price
                .and_then(Price::new)
                .ok_or_else(|| SiteError::SourceUnreachable {
                    source_name: self.name.clone(),
                    reason: "offline".to_string(),
                })
        }
    }

    fn fetcher(sources: &[Arc<FakeSource>], store: Arc<PriceStore>) -> PriceFetcher {
        let sources = sources
            .iter()
            .map(|s| s.clone() as Arc<dyn PriceSource>)
            .collect();
        PriceFetcher::new(sources, store)
    }

    #[tokio::test]
    async fn test_first_valid_source_wins_and_later_sources_are_skipped() {
        let a = FakeSource::new("A", None);
        let b = FakeSource::new("B", Some(50_000.0));
        let c = FakeSource::new("C", Some(99_000.0));
        let store = Arc::new(PriceStore::new());

        let outcome = fetcher(&[a.clone(), b.clone(), c.clone()], store.clone())
            .fetch_price()
            .await;

        assert_eq!(
            outcome,
            FetchOutcome::Success {
                price: Price::new(50_000.0).unwrap(),
                source: "B".to_string()
            }
        );
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 0));
        assert_eq!(store.current().unwrap().source, "B");
    }

    #[tokio::test]
    async fn test_all_sources_failing_keeps_previous_price() {
        let good = FakeSource::new("A", Some(48_000.0));
        let store = Arc::new(PriceStore::new());
        fetcher(&[good], store.clone()).fetch_price().await;
        let before = store.current();

        let a = FakeSource::new("A", None);
        let b = FakeSource::new("B", None);
        let outcome = fetcher(&[a.clone(), b.clone()], store.clone())
            .fetch_price()
            .await;

        assert_eq!(outcome, FetchOutcome::Failure { attempted: 2 });
        assert!(outcome.price().is_none());
        assert_eq!(store.current(), before);
        assert_eq!(store.status(), PriceStatus::Unavailable);
        assert_eq!((a.calls(), b.calls()), (1, 1));
    }

    #[tokio::test]
    async fn test_failure_without_prior_price_is_not_idle() {
        let store = Arc::new(PriceStore::new());
        let outcome = fetcher(&[FakeSource::new("A", None)], store.clone())
            .fetch_price()
            .await;

        assert!(!outcome.is_success());
        assert!(store.current().is_none());
        assert_eq!(store.status(), PriceStatus::Unavailable);
        assert_ne!(store.status(), PriceStatus::Idle);
    }

    #[tokio::test]
    async fn test_no_sources_is_a_failure() {
        let store = Arc::new(PriceStore::new());
        let outcome = PriceFetcher::new(Vec::new(), store.clone()).fetch_price().await;
        assert_eq!(outcome, FetchOutcome::Failure { attempted: 0 });
    }

    #[test]
    fn test_from_config_keeps_source_order() {
        let config = PriceConfig {
            timeout_seconds: Some(5),
            ..PriceConfig::default()
        };
        let fetcher = PriceFetcher::from_config(&config, Arc::new(PriceStore::new())).unwrap();
        assert_eq!(fetcher.source_names(), vec!["coingecko", "kraken", "coinbase"]);
    }
}
