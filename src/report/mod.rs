//! Report layout shared by the spreadsheet writer and the console table.

use rust_decimal::prelude::ToPrimitive;

use crate::models::{Horizon, ScoredRecord, Strategy};

pub mod console;
pub mod xlsx;

pub use console::print_report;
pub use xlsx::write_xlsx;

/// Width of every spreadsheet column, in Excel character units.
pub const COLUMN_WIDTH: f64 = 18.0;

/// Rendering semantics of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Currency,
    Integer,
    Percent,
}

/// Which field of a record a column shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnValue {
    Ticker,
    CompanyName,
    Price,
    Shares,
    Return(Horizon),
    Percentile(Horizon),
    HqmScore,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub kind: ColumnKind,
    pub value: ColumnValue,
}

impl Column {
    fn new(header: impl Into<String>, kind: ColumnKind, value: ColumnValue) -> Self {
        Self {
            header: header.into(),
            kind,
            value,
        }
    }

    pub fn cell(&self, record: &ScoredRecord) -> Cell {
        let number = |value: Option<f64>| value.map(Cell::Number).unwrap_or(Cell::Blank);
        match self.value {
            ColumnValue::Ticker => Cell::Text(record.quote.symbol.clone()),
            ColumnValue::CompanyName => record
                .quote
                .company_name
                .clone()
                .map(Cell::Text)
                .unwrap_or(Cell::Blank),
            ColumnValue::Price => number(record.quote.price.and_then(|p| p.to_f64())),
            ColumnValue::Shares => number(record.shares.as_ref().ok().map(|s| *s as f64)),
            ColumnValue::Return(h) => number(record.quote.returns.get(h)),
            ColumnValue::Percentile(h) => number(record.percentiles.get(h)),
            ColumnValue::HqmScore => number(record.hqm_score),
        }
    }
}

/// Column layout for a strategy's report.
pub fn columns(strategy: Strategy) -> Vec<Column> {
    use ColumnKind::*;

    match strategy {
        Strategy::Simple => vec![
            Column::new("Ticker", Text, ColumnValue::Ticker),
            Column::new("Company Name", Text, ColumnValue::CompanyName),
            Column::new("Stock Price", Currency, ColumnValue::Price),
            Column::new("One-Year Return", Percent, ColumnValue::Return(Horizon::OneYear)),
            Column::new("Number of Shares to Buy", Integer, ColumnValue::Shares),
        ],
        Strategy::Hqm => {
            let mut columns = vec![
                Column::new("Ticker", Text, ColumnValue::Ticker),
                Column::new("Company Name", Text, ColumnValue::CompanyName),
                Column::new("Stock Price", Currency, ColumnValue::Price),
                Column::new("Number of Shares to Buy", Integer, ColumnValue::Shares),
            ];
            for horizon in Horizon::ALL {
                columns.push(Column::new(
                    format!("{} Price Return", horizon.label()),
                    Percent,
                    ColumnValue::Return(horizon),
                ));
                columns.push(Column::new(
                    format!("{} Return Percentile", horizon.label()),
                    Percent,
                    ColumnValue::Percentile(horizon),
                ));
            }
            columns.push(Column::new("HQM Score", Percent, ColumnValue::HqmScore));
            columns
        }
    }
}
