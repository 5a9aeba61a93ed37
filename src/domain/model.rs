use crate::utils::error::{ComposeError, SiteError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// EUR per 1 BTC. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Price(f64);

impl Price {
    pub fn new(eur_per_btc: f64) -> Option<Self> {
        (eur_per_btc.is_finite() && eur_per_btc > 0.0).then_some(Self(eur_per_btc))
    }

    pub fn eur_per_btc(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} EUR/BTC", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub price: Price,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(price: Price, source: impl Into<String>) -> Self {
        Self {
            price,
            source: source.into(),
            fetched_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PriceStatus {
    /// 尚未抓取過
    #[default]
    Idle,
    Loading,
    Live { source: String },
    /// 最近一次抓取所有來源都失敗
    Unavailable,
}

impl PriceStatus {
    pub fn label(&self) -> String {
        match self {
            PriceStatus::Idle => "waiting for first price".to_string(),
            PriceStatus::Loading => "loading price...".to_string(),
            PriceStatus::Live { source } => format!("live price via {}", source),
            PriceStatus::Unavailable => "price unavailable".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success { price: Price, source: String },
    Failure { attempted: usize },
}

impl FetchOutcome {
    pub fn price(&self) -> Option<Price> {
        match self {
            FetchOutcome::Success { price, .. } => Some(*price),
            FetchOutcome::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

pub type FrontMatter = BTreeMap<String, String>;

/// A page under `_pages/`. `front_matter` is `None` for raw pages, which are copied as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    pub source_path: String,
    pub front_matter: Option<FrontMatter>,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSet {
    fragments: BTreeMap<String, String>,
}

impl IncludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.fragments.insert(name.into(), content.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fragments.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IncludeSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = IncludeSet::new();
        for (name, content) in iter {
            set.insert(name, content);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    pub path: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct SiteSources {
    pub pages: Vec<PageDocument>,
    pub includes: IncludeSet,
    pub assets: Vec<StaticAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub source_path: String,
    pub output_path: String,
    pub canonical_path: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub source_path: String,
    pub output_path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: String,
    pub error: ComposeError,
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.page, self.error)
    }
}

impl From<PageFailure> for SiteError {
    fn from(failure: PageFailure) -> Self {
        SiteError::PageError {
            page: failure.page,
            source: failure.error,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Composition {
    /// Keyed by canonical path (`/`, `/conversor/`, `/blog/que-es-dca/`).
    pub rendered: BTreeMap<String, RenderedPage>,
    pub raw: Vec<RawPage>,
    pub failures: Vec<PageFailure>,
    pub assets: Vec<StaticAsset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    pub output_dir: String,
    pub pages_built: Vec<String>,
    pub raw_copied: usize,
    pub assets_copied: usize,
    pub failures: Vec<String>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
