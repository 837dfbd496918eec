use serde::{Deserialize, Serialize};

use crate::{Ticker, UtcDateTime, ValidationError};

/// Most recent trading snapshot for a ticker, independent of any date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveQuote {
    pub ticker: Ticker,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub as_of: UtcDateTime,
}

impl LiveQuote {
    pub fn new(
        ticker: Ticker,
        price: f64,
        previous_close: Option<f64>,
        currency: Option<String>,
        exchange: Option<String>,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        if price < 0.0 {
            return Err(ValidationError::NegativeValue { field: "price" });
        }

        Ok(Self {
            ticker,
            price,
            previous_close: previous_close.filter(|value| value.is_finite()),
            currency: currency.map(|value| value.trim().to_ascii_uppercase()),
            exchange,
            as_of,
        })
    }

    /// Change versus the previous close, when the provider reported one.
    pub fn change(&self) -> Option<f64> {
        self.previous_close.map(|previous| self.price - previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_currency_and_computes_change() {
        let quote = LiveQuote::new(
            Ticker::parse("AAPL").expect("ticker"),
            190.5,
            Some(188.0),
            Some(String::from("usd")),
            Some(String::from("NMS")),
            UtcDateTime::now(),
        )
        .expect("valid quote");

        assert_eq!(quote.currency.as_deref(), Some("USD"));
        assert_eq!(quote.change(), Some(2.5));
    }

    #[test]
    fn rejects_negative_price() {
        let err = LiveQuote::new(
            Ticker::parse("AAPL").expect("ticker"),
            -1.0,
            None,
            None,
            None,
            UtcDateTime::now(),
        )
        .expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "price" });
    }
}
