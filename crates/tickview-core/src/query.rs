//! Input collection for one render pass.
//!
//! [`QueryBuilder`] holds the raw widget values (form fields or CLI args) and
//! turns them into a [`PriceQuery`] once a ticker has been entered.

use serde::Serialize;
use time::Date;
use tracing::warn;

use crate::{parse_date, DateRange, Ticker, DEFAULT_START_DATE};

/// Validated inputs for the history fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuery {
    pub ticker: Ticker,
    pub range: DateRange,
}

/// Current values of the ticker, start date and end date inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    ticker: String,
    start_date: Date,
    end_date: Date,
}

impl QueryBuilder {
    /// Empty ticker, start on the default date, end on `today`.
    pub fn new(today: Date) -> Self {
        Self {
            ticker: String::new(),
            start_date: DEFAULT_START_DATE,
            end_date: today,
        }
    }

    /// Build from raw form values.
    ///
    /// A date field that is missing, blank or malformed keeps its default.
    pub fn from_form(
        ticker: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        today: Date,
    ) -> Self {
        let defaults = Self::new(today);
        Self {
            ticker: ticker.unwrap_or_default().to_owned(),
            start_date: date_or_default("start", start, defaults.start_date),
            end_date: date_or_default("end", end, defaults.end_date),
        }
    }

    pub fn with_ticker(mut self, raw: impl Into<String>) -> Self {
        self.ticker = raw.into();
        self
    }

    pub fn with_start_date(mut self, start: Date) -> Self {
        self.start_date = start;
        self
    }

    pub fn with_end_date(mut self, end: Date) -> Self {
        self.end_date = end;
        self
    }

    /// Raw ticker as entered.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn start_date(&self) -> Date {
        self.start_date
    }

    pub fn end_date(&self) -> Date {
        self.end_date
    }

    /// `None` until a non-blank ticker has been entered.
    ///
    /// The range is taken as is; start after end is not rejected here.
    pub fn query(&self) -> Option<PriceQuery> {
        Ticker::parse(&self.ticker).map(|ticker| PriceQuery {
            ticker,
            range: DateRange::new(self.start_date, self.end_date),
        })
    }
}

fn date_or_default(field: &'static str, raw: Option<&str>, default: Date) -> Date {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return default;
    };
    match parse_date(raw) {
        Ok(date) => date,
        Err(error) => {
            warn!(field, error = %error, "ignoring malformed date input");
            default
        }
    }
}
