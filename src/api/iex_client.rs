use anyhow::Result;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{ApiRateLimiter, BatchQuotes, MarketDataProvider};
use crate::error::BatchError;
use crate::models::{Config, HorizonValues, QuoteRecord};

/// Per-symbol entry of the `stock/market/batch` response
#[derive(Debug, Deserialize)]
struct BatchEntry {
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    stats: Option<KeyStats>,
}

/// The subset of IEX key stats the strategies use
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStats {
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    year1_change_percent: Option<f64>,
    #[serde(default)]
    month6_change_percent: Option<f64>,
    #[serde(default)]
    month3_change_percent: Option<f64>,
    #[serde(default)]
    month1_change_percent: Option<f64>,
}

impl BatchEntry {
    fn into_record(self, symbol: String) -> QuoteRecord {
        let stats = self.stats.unwrap_or_default();
        QuoteRecord {
            symbol,
            company_name: stats.company_name,
            price: self.price,
            returns: HorizonValues {
                year1: stats.year1_change_percent,
                month6: stats.month6_change_percent,
                month3: stats.month3_change_percent,
                month1: stats.month1_change_percent,
            },
        }
    }
}

/// IEX Cloud batch market-data client
pub struct IexClient {
    client: Client,
    endpoint: String,
    token: String,
    rate_limiter: ApiRateLimiter,
}

impl IexClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("rust-momentum/0.1")
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/stock/market/batch", config.base_url.trim_end_matches('/')),
            token: config.api_token.clone(),
            rate_limiter: ApiRateLimiter::new(config.rate_limit_per_minute),
        })
    }

    fn batch_url(&self, symbols: &[String]) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("symbols", symbols.join(",")),
                ("types", "price,stats".to_string()),
                ("token", self.token.clone()),
            ],
        )
    }
}

/// Longest error body kept in a `BatchError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 200;

fn truncate_body(body: &str) -> String {
    let mut chars = body.trim().chars();
    let head: String = chars.by_ref().take(MAX_ERROR_BODY_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Decode a batch response body into quote records.
fn parse_batch_response(body: &[u8]) -> Result<BatchQuotes, BatchError> {
    let entries: HashMap<String, BatchEntry> = serde_json::from_slice(body)?;
    Ok(entries
        .into_iter()
        .map(|(symbol, entry)| (symbol.clone(), entry.into_record(symbol)))
        .collect())
}

#[async_trait::async_trait]
impl MarketDataProvider for IexClient {
    async fn get_batch(&self, symbols: &[String]) -> Result<BatchQuotes, BatchError> {
        if symbols.is_empty() {
            return Ok(BatchQuotes::new());
        }

        let url = self.batch_url(symbols)?;

        self.rate_limiter.wait().await;

        debug!("Requesting batch of {} symbols", symbols.len());
        // The URL carries the token, so it is stripped from transport errors
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BatchError::Transport(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BatchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BatchError::Transport(e.without_url()))?;
        let quotes = parse_batch_response(&body)?;
        debug!("Retrieved {} quotes for {} symbols", quotes.len(), symbols.len());
        Ok(quotes)
    }
}
