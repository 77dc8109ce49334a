use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::QuoteError;

/// Equal-weight position sizing over a fixed number of holdings
#[derive(Debug, Clone, Copy)]
pub struct PositionSizer {
    portfolio_size: Decimal,
    target_holdings: u32,
}

impl PositionSizer {
    pub fn new(portfolio_size: Decimal, target_holdings: u32) -> Self {
        Self {
            portfolio_size,
            target_holdings,
        }
    }

    /// Shares of `symbol` purchasable with one holding's allocation:
    /// `floor(portfolio_size / target_holdings / price)`.
    pub fn shares_to_buy(&self, symbol: &str, price: Option<Decimal>) -> Result<u64, QuoteError> {
        let invalid = || QuoteError::InvalidQuote {
            symbol: symbol.to_string(),
            price,
        };

        let price = price.filter(|p| p.is_sign_positive() && !p.is_zero()).ok_or_else(invalid)?;

        self.portfolio_size
            .checked_div(Decimal::from(self.target_holdings))
            .and_then(|allocation| allocation.checked_div(price))
            .map(|shares| shares.floor().max(Decimal::ZERO))
            .and_then(|shares| shares.to_u64())
            .ok_or_else(invalid)
    }
}
