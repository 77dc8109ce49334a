use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Fatal setup problems: bad environment, bad flags, bad universe file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable required")]
    MissingVar(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read universe file {path}: {source}")]
    UniverseRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("universe file {path} has no `Ticker` column")]
    MissingTickerColumn { path: PathBuf },

    #[error("universe file {path} has a blank ticker on line {line}")]
    BlankTicker { path: PathBuf, line: u64 },

    #[error("universe file {path} contains no tickers")]
    EmptyUniverse { path: PathBuf },
}

/// Failure of one batch request. The whole batch is dropped.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("request failed: {0}")]
    /// Built with `without_url` so the query token never reaches logs
    Transport(reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Per-record problems that exclude a stock from the report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    #[error("invalid quote for {symbol}: price {price:?} is not positive")]
    InvalidQuote {
        symbol: String,
        price: Option<Decimal>,
    },

    #[error("{symbol} missing from provider response")]
    MissingSymbol { symbol: String },

    #[error("{symbol} has no momentum data for this strategy")]
    NoMomentumData { symbol: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
