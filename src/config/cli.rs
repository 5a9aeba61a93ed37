use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "bitcoin-calculadora")]
#[command(about = "Static site builder and BTC/EUR price fetcher for Bitcoin Calculadora")]
pub struct CliConfig {
    /// Path to the site configuration file (optional)
    #[arg(long, global = true, default_value = super::DEFAULT_CONFIG_FILE)]
    pub config: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Assemble every page into the output directory
    Build,

    /// Fetch the current BTC price in EUR from the configured sources
    Price {
        /// Keep refreshing on the configured interval until Ctrl-C
        #[arg(long)]
        watch: bool,

        /// Convert this EUR amount to BTC and sats (on every update with --watch)
        #[arg(long)]
        eur: Option<f64>,

        /// Convert this many sats to EUR (on every update with --watch)
        #[arg(long)]
        sats: Option<u64>,

        /// Print the result as JSON, one line per update
        #[arg(long)]
        json: bool,
    },
}
