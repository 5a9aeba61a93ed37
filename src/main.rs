use bitcoin_calculadora::core::price::{PriceQuote, QuoteRequest};
use bitcoin_calculadora::domain::model::{PriceSnapshot, PriceStatus};
use bitcoin_calculadora::domain::ports::PriceObserver;
use bitcoin_calculadora::utils::{logger, validation::Validate};
use bitcoin_calculadora::{
    BuildEngine, CliConfig, Command, PriceFetcher, PriceStore, PriceTicker, SiteConfig, SiteError,
    SitePipeline,
};
use clap::Parser;
use std::sync::Arc;

/// Prints every update while `price --watch` runs.
struct ConsoleObserver {
    request: QuoteRequest,
    json: bool,
}

impl PriceObserver for ConsoleObserver {
    fn on_price(&self, snapshot: &PriceSnapshot) {
        if let Err(e) = print_quote(&PriceQuote::new(snapshot, self.request), self.json) {
            tracing::error!("❌ {}", e);
        }
    }

    fn on_status(&self, status: &PriceStatus) {
        if *status == PriceStatus::Unavailable {
            eprintln!("⚠️  {}", status.label());
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI arguments: {:?}", cli);

    let config = match SiteConfig::load_or_default(&cli.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    let result = match cli.command {
        Command::Build => build(config).await,
        Command::Price {
            watch,
            eur,
            sats,
            json,
        } => {
            let request = QuoteRequest { eur, sats };
            if watch {
                watch_price(config, request, json).await
            } else {
                price_once(config, request, json).await
            }
        }
    };

    if let Err(e) = result {
        exit_with(e);
    }
}

async fn build(config: SiteConfig) -> Result<(), SiteError> {
    let engine = BuildEngine::new(SitePipeline::local(config));
    let report = engine.run().await?;

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("❌ {}", failure);
        }
        return Err(SiteError::BuildFailed {
            failed: report.failures.len(),
            total: report.failures.len() + report.pages_built.len() + report.raw_copied,
        });
    }

    println!(
        "✅ Built {} pages into {}/",
        report.pages_built.len() + report.raw_copied,
        report.output_dir
    );
    Ok(())
}

async fn price_once(config: SiteConfig, request: QuoteRequest, json: bool) -> Result<(), SiteError> {
    let store = Arc::new(PriceStore::new());
    let fetcher = PriceFetcher::from_config(&config.price, store.clone())?;

    if !fetcher.fetch_price().await.is_success() {
        return Err(SiteError::AllSourcesExhausted {
            attempted: fetcher.source_names().len(),
        });
    }

    match store.current() {
        Some(snapshot) => print_quote(&PriceQuote::new(&snapshot, request), json),
        None => Err(SiteError::AllSourcesExhausted {
            attempted: fetcher.source_names().len(),
        }),
    }
}

async fn watch_price(config: SiteConfig, request: QuoteRequest, json: bool) -> Result<(), SiteError> {
    let store = Arc::new(PriceStore::new());
    store.subscribe(Arc::new(ConsoleObserver { request, json }));

    let fetcher = Arc::new(PriceFetcher::from_config(&config.price, store)?);
    let handle = PriceTicker::new(fetcher, config.price.refresh_interval()).spawn();

    tracing::info!("👀 Watching price, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    handle.stop().await;
    tracing::info!("👋 Stopped");
    Ok(())
}

/// JSON is one document per line so `--watch --json` output can be piped.
fn print_quote(quote: &PriceQuote, json: bool) -> Result<(), SiteError> {
    if json {
        println!("{}", serde_json::to_string(quote)?);
    } else {
        for line in quote.lines() {
            println!("{}", line);
        }
    }
    Ok(())
}

fn exit_with(e: SiteError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
