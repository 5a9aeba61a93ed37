#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "site.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub paths: PathsConfig,
    pub assets: AssetsConfig,
    /// 每個頁面都能用的變數，頁面 front-matter 會覆蓋同名的值
    pub globals: BTreeMap<String, String>,
    pub price: PriceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub src_dir: String,
    pub output_dir: String,
    pub pages_dir: String,
    pub includes_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src_dir: "src".to_string(),
            output_dir: "docs".to_string(),
            pages_dir: "_pages".to_string(),
            includes_dir: "_includes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directories copied recursively, unchanged.
    pub dirs: Vec<String>,
    /// Single files copied when present.
    pub files: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dirs: vec!["css".to_string(), "js".to_string()],
            files: vec![
                "CNAME".to_string(),
                "robots.txt".to_string(),
                "sitemap.xml".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub refresh_interval_seconds: u64,
    /// Per-request timeout. Unset leaves the HTTP client default in place.
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
    pub sources: Vec<SourceConfig>,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 60,
            timeout_seconds: None,
            user_agent: concat!("bitcoin-calculadora/", env!("CARGO_PKG_VERSION")).to_string(),
            sources: default_sources(),
        }
    }
}

impl PriceConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub endpoint: String,
    /// JSON pointer (RFC 6901) to the EUR price inside the response.
    pub pointer: String,
    pub multiplier: Option<f64>,
}

/// EUR-quoted public tickers, in fallback order.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            name: "coingecko".to_string(),
            endpoint: "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=eur"
                .to_string(),
            pointer: "/bitcoin/eur".to_string(),
            multiplier: None,
        },
        SourceConfig {
            name: "kraken".to_string(),
            endpoint: "https://api.kraken.com/0/public/Ticker?pair=XBTEUR".to_string(),
            pointer: "/result/XXBTZEUR/c/0".to_string(),
            multiplier: None,
        },
        SourceConfig {
            name: "coinbase".to_string(),
            endpoint: "https://api.coinbase.com/v2/prices/BTC-EUR/spot".to_string(),
            pointer: "/data/amount".to_string(),
            multiplier: None,
        },
    ]
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Missing file means defaults; a present but broken file is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("{} not found, using default configuration", path.display());
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SITE_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("paths.src_dir", &self.paths.src_dir)?;
        validation::validate_path("paths.output_dir", &self.paths.output_dir)?;
        validation::validate_relative_name("paths.pages_dir", &self.paths.pages_dir)?;
        validation::validate_relative_name("paths.includes_dir", &self.paths.includes_dir)?;

        // 輸出目錄每次 build 都會被清空，不能與來源重疊
        let src = normalize(&self.paths.src_dir);
        let out = normalize(&self.paths.output_dir);
        if src.starts_with(&out) || out.starts_with(&src) {
            return Err(SiteError::InvalidConfigValueError {
                field: "paths.output_dir".to_string(),
                value: self.paths.output_dir.clone(),
                reason: "Output directory must not overlap the source directory".to_string(),
            });
        }

        for dir in &self.assets.dirs {
            validation::validate_relative_name("assets.dirs", dir)?;
        }
        for file in &self.assets.files {
            validation::validate_relative_name("assets.files", file)?;
        }

        self.price.validate()
    }
}

impl Validate for PriceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number(
            "price.refresh_interval_seconds",
            self.refresh_interval_seconds,
            1,
        )?;
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_range("price.timeout_seconds", timeout, 1, 300)?;
        }

        if self.sources.is_empty() {
            return Err(SiteError::MissingConfigError {
                field: "price.sources".to_string(),
            });
        }

        for source in &self.sources {
            validation::validate_non_empty_string("price.sources.name", &source.name)?;
            validation::validate_url("price.sources.endpoint", &source.endpoint)?;
            if !source.pointer.is_empty() && !source.pointer.starts_with('/') {
                return Err(SiteError::InvalidConfigValueError {
                    field: "price.sources.pointer".to_string(),
                    value: source.pointer.clone(),
                    reason: "JSON pointer must be empty or start with '/'".to_string(),
                });
            }
            if let Some(multiplier) = source.multiplier {
                if !(multiplier.is_finite() && multiplier > 0.0) {
                    return Err(SiteError::InvalidConfigValueError {
                        field: "price.sources.multiplier".to_string(),
                        value: multiplier.to_string(),
                        reason: "Multiplier must be a positive number".to_string(),
                    });
                }
            }
        }

        validation::validate_unique_names(
            "price.sources.name",
            self.sources.iter().map(|s| s.name.as_str()),
        )
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

impl ConfigProvider for SiteConfig {
    fn src_dir(&self) -> &str {
        &self.paths.src_dir
    }

    fn output_dir(&self) -> &str {
        &self.paths.output_dir
    }

    fn pages_dir(&self) -> &str {
        &self.paths.pages_dir
    }

    fn includes_dir(&self) -> &str {
        &self.paths.includes_dir
    }

    fn asset_dirs(&self) -> &[String] {
        &self.assets.dirs
    }

    fn asset_files(&self) -> &[String] {
        &self.assets.files
    }

    fn globals(&self) -> &BTreeMap<String, String> {
        &self.globals
    }
}

fn normalize(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
