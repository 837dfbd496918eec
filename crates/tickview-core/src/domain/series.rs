use serde::{Deserialize, Serialize};
use time::Date;

use super::date_range::iso_date;
use crate::{Ticker, ValidationError};

/// One trading day of a historical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adj_close: f64,
    pub volume: Option<u64>,
}

impl PriceRow {
    /// Build a row; a missing adjusted close falls back to `close`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: Date,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: f64,
        adj_close: Option<f64>,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_price("close", close)?;
        validate_optional_price("open", open)?;
        validate_optional_price("high", high)?;
        validate_optional_price("low", low)?;
        validate_optional_price("adj_close", adj_close)?;

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            adj_close: adj_close.unwrap_or(close),
            volume,
        })
    }

    /// Row with only a close; used by stubs and fixtures.
    pub fn close_only(date: Date, close: f64) -> Result<Self, ValidationError> {
        Self::new(date, None, None, None, close, None, None)
    }
}

/// Ordered per-trading-day records for one ticker, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: Ticker,
    pub rows: Vec<PriceRow>,
}

impl PriceSeries {
    pub fn new(ticker: Ticker, mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by_key(|row| row.date);
        Self { ticker, rows }
    }

    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn last_row(&self) -> Option<&PriceRow> {
        self.rows.last()
    }

    /// `close` of the most recent row.
    pub fn last_close(&self) -> Option<f64> {
        self.last_row().map(|row| row.close)
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.rows.iter().map(|row| row.date)
    }

    pub fn adj_closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|row| row.adj_close)
    }
}

fn validate_price(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_price(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_price(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn ticker() -> Ticker {
        Ticker::parse("MSFT").expect("valid ticker")
    }

    #[test]
    fn adj_close_falls_back_to_close() {
        let row = PriceRow::close_only(date!(2015 - 01 - 02), 46.76).expect("valid row");
        assert_eq!(row.adj_close, 46.76);
    }

    #[test]
    fn rejects_non_finite_close() {
        let err = PriceRow::close_only(date!(2015 - 01 - 02), f64::NAN).expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "close" });
    }

    #[test]
    fn rows_are_ordered_by_date_and_last_close_is_latest() {
        let series = PriceSeries::new(
            ticker(),
            vec![
                PriceRow::close_only(date!(2015 - 01 - 05), 46.33).expect("row"),
                PriceRow::close_only(date!(2015 - 01 - 02), 46.76).expect("row"),
            ],
        );

        assert_eq!(series.len(), 2);
        assert_eq!(series.dates().next(), Some(date!(2015 - 01 - 02)));
        assert_eq!(series.last_close(), Some(46.33));
    }

    #[test]
    fn empty_series_has_no_last_close() {
        let series = PriceSeries::empty(ticker());
        assert!(series.is_empty());
        assert_eq!(series.last_close(), None);
    }
}
