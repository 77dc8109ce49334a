use std::collections::HashMap;
use std::num::NonZeroU32;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::error::BatchError;
use crate::models::QuoteRecord;

pub mod iex_client;
pub use iex_client::IexClient;

/// Quotes returned by one batch request, keyed by symbol.
pub type BatchQuotes = HashMap<String, QuoteRecord>;

/// Optional requests-per-minute throttle in front of the provider
pub struct ApiRateLimiter {
    limiter: Option<DefaultDirectRateLimiter>,
}

impl ApiRateLimiter {
    /// A quota of 0 disables throttling.
    pub fn new(requests_per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_minute)
            .map(|per_minute| RateLimiter::direct(Quota::per_minute(per_minute)));
        Self { limiter }
    }

    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

/// Source of batched price and trailing-return statistics
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch price and stats for every symbol in one request.
    ///
    /// Symbols the provider does not know are simply absent from the map.
    async fn get_batch(&self, symbols: &[String]) -> Result<BatchQuotes, BatchError>;
}
