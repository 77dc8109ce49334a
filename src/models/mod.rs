use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, QuoteError};

/// IEX Cloud batch endpoint accepts at most this many symbols per request.
pub const MAX_SYMBOLS_PER_REQUEST: usize = 100;

pub const DEFAULT_BASE_URL: &str = "https://sandbox.iexapis.com/stable";

/// Trailing-return horizons, in report column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    OneYear,
    SixMonth,
    ThreeMonth,
    OneMonth,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::OneYear,
        Horizon::SixMonth,
        Horizon::ThreeMonth,
        Horizon::OneMonth,
    ];

    fn index(self) -> usize {
        match self {
            Horizon::OneYear => 0,
            Horizon::SixMonth => 1,
            Horizon::ThreeMonth => 2,
            Horizon::OneMonth => 3,
        }
    }

    /// Column label prefix used in the spreadsheet.
    pub fn label(self) -> &'static str {
        match self {
            Horizon::OneYear => "One-Year",
            Horizon::SixMonth => "Six-Month",
            Horizon::ThreeMonth => "Three-Month",
            Horizon::OneMonth => "One-Month",
        }
    }
}

/// One optional value per horizon. Used for returns and for percentiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizonValues {
    pub year1: Option<f64>,
    pub month6: Option<f64>,
    pub month3: Option<f64>,
    pub month1: Option<f64>,
}

impl HorizonValues {
    pub fn get(&self, horizon: Horizon) -> Option<f64> {
        self.as_array()[horizon.index()]
    }

    pub fn set(&mut self, horizon: Horizon, value: Option<f64>) {
        match horizon {
            Horizon::OneYear => self.year1 = value,
            Horizon::SixMonth => self.month6 = value,
            Horizon::ThreeMonth => self.month3 = value,
            Horizon::OneMonth => self.month1 = value,
        }
    }

    /// Values that are present, in horizon order.
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        Horizon::ALL.iter().filter_map(move |h| self.get(*h))
    }

    fn as_array(&self) -> [Option<f64>; 4] {
        [self.year1, self.month6, self.month3, self.month1]
    }
}

/// Price and trailing statistics for one ticker, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub company_name: Option<String>,
    pub price: Option<Decimal>,
    pub returns: HorizonValues,
}

/// A quote extended with its momentum scores and position size.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub quote: QuoteRecord,
    /// Position in the fetched universe; the tie-breaker for ranking.
    pub fetch_index: usize,
    pub percentiles: HorizonValues,
    pub hqm_score: Option<f64>,
    pub shares: Result<u64, QuoteError>,
}

impl ScoredRecord {
    pub fn symbol(&self) -> &str {
        &self.quote.symbol
    }
}

/// Ranking variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Rank by raw one-year return
    Simple,
    /// Rank by the mean of four per-horizon percentile ranks
    Hqm,
}

impl Strategy {
    pub fn sheet_name(self) -> &'static str {
        match self {
            Strategy::Simple => "Recommended Trades",
            Strategy::Hqm => "Momentum Strategy",
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            Strategy::Simple => "Portfolio_Momentum_Trades.xlsx",
            Strategy::Hqm => "HQM_Momentum_Strategy.xlsx",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Simple => write!(f, "simple"),
            Strategy::Hqm => write!(f, "hqm"),
        }
    }
}

/// Tie convention for percentile ranks, named after the usual
/// `percentileofscore` kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PercentileKind {
    /// (less + (equal + 1) / 2) / n; a unique maximum ranks 1.0
    Rank,
    /// (less + equal / 2) / n
    Mean,
    /// (less + equal) / n
    Weak,
    /// less / n
    Strict,
}

/// How the universe is cut into requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPlan {
    /// Chunks of this many symbols, the last one possibly shorter
    Size(usize),
    /// This many chunks with sizes differing by at most one
    Count(usize),
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub base_url: String,
    pub universe_path: PathBuf,
    pub portfolio_size: Decimal,
    pub target_holdings: u32,
    pub batch_plan: BatchPlan,
    /// Top N rows in the report; 0 keeps every valid record. Unset follows
    /// `target_holdings`, see [`Config::report_limit`].
    pub report_limit: Option<usize>,
    pub output_path: Option<PathBuf>,
    pub strategy: Strategy,
    pub percentile_kind: PercentileKind,
    pub max_concurrent_batches: usize,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Values are parsed but not range-checked, so CLI flags can still replace
    /// them; call [`Config::validate`] once overrides are applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reading from a map, for tests.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let target_holdings: u32 = parse_var(&lookup, "TARGET_HOLDINGS")?.unwrap_or(50);

        let batch_plan = match parse_var::<usize>(&lookup, "BATCH_COUNT")? {
            Some(count) => BatchPlan::Count(count),
            None => BatchPlan::Size(parse_var(&lookup, "BATCH_SIZE")?.unwrap_or(MAX_SYMBOLS_PER_REQUEST)),
        };

        Ok(Config {
            // The token may be absent when replaying a snapshot; `validate_for_network`
            // enforces it before any request is made.
            api_token: lookup("IEX_API_TOKEN").unwrap_or_default(),
            base_url: lookup("IEX_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            universe_path: lookup("UNIVERSE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("sp_500_stocks.csv")),
            portfolio_size: parse_var(&lookup, "PORTFOLIO_SIZE")?
                .unwrap_or_else(|| Decimal::from(10_000_000)),
            target_holdings,
            batch_plan,
            report_limit: parse_var(&lookup, "REPORT_LIMIT")?,
            output_path: lookup("OUTPUT_PATH").map(PathBuf::from),
            strategy: parse_enum(&lookup, "STRATEGY")?.unwrap_or(Strategy::Hqm),
            percentile_kind: parse_enum(&lookup, "PERCENTILE_KIND")?.unwrap_or(PercentileKind::Rank),
            max_concurrent_batches: parse_var(&lookup, "MAX_CONCURRENT_BATCHES")?.unwrap_or(1),
            rate_limit_per_minute: parse_var(&lookup, "RATE_LIMIT_PER_MINUTE")?.unwrap_or(0),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS")?.unwrap_or(30),
        })
    }

    /// Check value ranges. Run once, after CLI overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portfolio_size <= Decimal::ZERO {
            return Err(invalid("PORTFOLIO_SIZE", self.portfolio_size, "must be positive"));
        }
        if self.target_holdings == 0 {
            return Err(invalid("TARGET_HOLDINGS", self.target_holdings, "must be at least 1"));
        }
        match self.batch_plan {
            BatchPlan::Size(size) if size == 0 || size > MAX_SYMBOLS_PER_REQUEST => {
                return Err(invalid(
                    "BATCH_SIZE",
                    size,
                    &format!("must be between 1 and {}", MAX_SYMBOLS_PER_REQUEST),
                ));
            }
            BatchPlan::Count(0) => return Err(invalid("BATCH_COUNT", 0, "must be at least 1")),
            _ => {}
        }
        if self.max_concurrent_batches == 0 {
            return Err(invalid("MAX_CONCURRENT_BATCHES", 0, "must be at least 1"));
        }
        Ok(())
    }

    /// Requirements that only apply when talking to the live provider.
    pub fn validate_for_network(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingVar("IEX_API_TOKEN"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| invalid("IEX_BASE_URL", &self.base_url, &e.to_string()))?;
        Ok(())
    }

    /// Rows to keep in the report, defaulting to one per target holding.
    pub fn report_limit(&self) -> usize {
        self.report_limit.unwrap_or(self.target_holdings as usize)
    }

    /// Output file, falling back to the strategy's default name.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.strategy.default_output()))
    }
}

fn invalid(key: &'static str, value: impl fmt::Display, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
        None => Ok(None),
    }
}

fn parse_enum<T: ValueEnum>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(raw) => T::from_str(raw.trim(), true)
            .map(Some)
            .map_err(|e| invalid(key, &raw, &e)),
        None => Ok(None),
    }
}
