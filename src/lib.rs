pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, Command};
pub use crate::config::SiteConfig;

pub use crate::adapters::{JsonPointerSource, LocalStorage};
pub use crate::core::{
    engine::BuildEngine,
    price::{PriceFetcher, PriceStore, PriceTicker, PriceWidget},
    site::SitePipeline,
};
pub use crate::utils::error::{ComposeError, Result, SiteError};
