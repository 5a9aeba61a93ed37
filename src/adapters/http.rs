use crate::config::SourceConfig;
use crate::domain::model::Price;
use crate::domain::ports::PriceSource;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;

/// HTTP GET source whose price sits at an RFC 6901 pointer in the JSON body.
///
/// The value may be a JSON number or a numeric string (Kraken and Coinbase quote
/// prices as strings). `multiplier` is applied after extraction.
#[derive(Debug, Clone)]
pub struct JsonPointerSource {
    name: String,
    endpoint: String,
    pointer: String,
    multiplier: f64,
}

impl JsonPointerSource {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        pointer: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            pointer: pointer.into(),
            multiplier: 1.0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.name, &config.endpoint, &config.pointer)
            .with_multiplier(config.multiplier.unwrap_or(1.0))
    }

    pub fn parse(&self, body: &Value) -> Result<Price> {
        let value = body
            .pointer(&self.pointer)
            .ok_or_else(|| self.malformed(format!("no value at '{}'", self.pointer)))?;

        let amount = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| self.malformed(format!("value at '{}' is not numeric: {}", self.pointer, value)))?;

        Price::new(amount * self.multiplier)
            .ok_or_else(|| self.malformed(format!("{} is not a usable price", amount)))
    }

    fn malformed(&self, reason: String) -> SiteError {
        SiteError::SourceMalformed {
            source_name: self.name.clone(),
            reason,
        }
    }

    fn unreachable(&self, reason: String) -> SiteError {
        SiteError::SourceUnreachable {
            source_name: self.name.clone(),
            reason,
        }
    }
}

#[async_trait]
impl PriceSource for JsonPointerSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_price(&self, client: &Client) -> Result<Price> {
        tracing::debug!("Requesting {} ({})", self.name, self.endpoint);

        let response = client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unreachable(format!("HTTP status {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| self.malformed(format!("invalid JSON: {}", e)))?;

        self.parse(&body)
    }
}
