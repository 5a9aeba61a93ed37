use anyhow::Result;
use bitcoin_calculadora::config::{PriceConfig, SiteConfig, SourceConfig};
use bitcoin_calculadora::core::price::convert;
use bitcoin_calculadora::domain::model::{FetchOutcome, PriceStatus};
use bitcoin_calculadora::{PriceFetcher, PriceStore, PriceWidget};
use httpmock::prelude::*;
use std::sync::Arc;

fn source(name: &str, endpoint: String, pointer: &str) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        endpoint,
        pointer: pointer.to_string(),
        multiplier: None,
    }
}

fn price_config(sources: Vec<SourceConfig>) -> PriceConfig {
    PriceConfig {
        timeout_seconds: Some(5),
        sources,
        ..PriceConfig::default()
    }
}

#[tokio::test]
async fn test_falls_back_to_second_source() -> Result<()> {
    let server = MockServer::start();

    let a = server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(500);
    });
    let b = server.mock(|when, then| {
        when.method(GET).path("/b");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"bitcoin": {"eur": 50000}}));
    });
    let c = server.mock(|when, then| {
        when.method(GET).path("/c");
        then.status(200)
            .json_body(serde_json::json!({"data": {"amount": "99000.00"}}));
    });

    let config = price_config(vec![
        source("A", server.url("/a"), "/bitcoin/eur"),
        source("B", server.url("/b"), "/bitcoin/eur"),
        source("C", server.url("/c"), "/data/amount"),
    ]);
    let store = Arc::new(PriceStore::new());
    let widget = Arc::new(PriceWidget::new());
    store.subscribe(widget.clone());

    let outcome = PriceFetcher::from_config(&config, store.clone())?
        .fetch_price()
        .await;

    match outcome {
        FetchOutcome::Success { price, source } => {
            assert_eq!(price.eur_per_btc(), 50_000.0);
            assert_eq!(source, "B");
        }
        other => panic!("expected success, got {:?}", other),
    }
    a.assert_hits(1);
    b.assert_hits(1);
    c.assert_hits(0);

    assert_eq!(widget.view().price_text, "50.000,00 €");
    assert_eq!(convert::eur_to_sats(100.0, store.current_price()), 200_000);
    Ok(())
}

#[tokio::test]
async fn test_malformed_and_zero_prices_are_skipped() -> Result<()> {
    let server = MockServer::start();

    let broken = server.mock(|when, then| {
        when.method(GET).path("/broken");
        then.status(200).body("<html>maintenance</html>");
    });
    let zero = server.mock(|when, then| {
        when.method(GET).path("/zero");
        then.status(200).json_body(serde_json::json!({"price": 0}));
    });
    let kraken = server.mock(|when, then| {
        when.method(GET).path("/kraken");
        then.status(200).json_body(serde_json::json!({
            "error": [],
            "result": {"XXBTZEUR": {"c": ["57321.40000", "0.001"]}}
        }));
    });

    let config = price_config(vec![
        source("broken", server.url("/broken"), "/price"),
        source("zero", server.url("/zero"), "/price"),
        source("kraken", server.url("/kraken"), "/result/XXBTZEUR/c/0"),
    ]);
    let store = Arc::new(PriceStore::new());

    let outcome = PriceFetcher::from_config(&config, store.clone())?
        .fetch_price()
        .await;

    assert_eq!(outcome.price().map(|p| p.eur_per_btc()), Some(57_321.4));
    broken.assert_hits(1);
    zero.assert_hits(1);
    kraken.assert_hits(1);
    assert_eq!(
        store.status(),
        PriceStatus::Live {
            source: "kraken".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_all_sources_down_keeps_last_price() -> Result<()> {
    let server = MockServer::start();

    let mut up = server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(200).json_body(serde_json::json!({"eur": 48000.5}));
    });

    let config = price_config(vec![
        source("A", server.url("/a"), "/eur"),
        source("B", server.url("/b"), "/eur"),
    ]);
    let store = Arc::new(PriceStore::new());
    let fetcher = PriceFetcher::from_config(&config, store.clone())?;

    assert!(fetcher.fetch_price().await.is_success());
    up.delete();

    let a_down = server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(503);
    });
    let b_down = server.mock(|when, then| {
        when.method(GET).path("/b");
        then.status(404);
    });

    let outcome = fetcher.fetch_price().await;

    assert_eq!(outcome, FetchOutcome::Failure { attempted: 2 });
    a_down.assert_hits(1);
    b_down.assert_hits(1);
    assert_eq!(store.status(), PriceStatus::Unavailable);
    assert_eq!(store.current_price().map(|p| p.eur_per_btc()), Some(48_000.5));
    assert_eq!(store.current().map(|s| s.source), Some("A".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_sources_from_toml_with_multiplier() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/cents");
        then.status(200).json_body(serde_json::json!({"last": 5000000}));
    });

    let toml = format!(
        r#"
[price]
timeout_seconds = 5

[[price.sources]]
name = "cents"
endpoint = "{}"
pointer = "/last"
multiplier = 0.01
"#,
        server.url("/cents")
    );
    let config = SiteConfig::from_toml_str(&toml)?;
    let store = Arc::new(PriceStore::new());

    let outcome = PriceFetcher::from_config(&config.price, store)?
        .fetch_price()
        .await;

    mock.assert();
    assert_eq!(outcome.price().map(|p| p.eur_per_btc()), Some(50_000.0));
    Ok(())
}
