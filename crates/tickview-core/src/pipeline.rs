//! Fetch-and-render pipeline.
//!
//! One pass per render: decide whether a ticker was entered, fetch the
//! history once, check for emptiness, then build the view. Nothing is kept
//! between passes.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data_source::{HistoryRequest, LiveQuoteRequest, PriceSource};
use crate::query::{PriceQuery, QueryBuilder};
use crate::view::{Block, LineChart, TIPS, TIPS_HEADING};
use crate::{LiveQuote, PriceSeries, Ticker};

pub const NO_TICKER_MESSAGE: &str = "Please enter a valid ticker.";
pub const NO_DATA_MESSAGE: &str = "No data available for the given ticker and date range.";

/// Pipeline switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Fetch the live quote after a non-empty history.
    pub live_quote: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { live_quote: true }
    }
}

/// Data behind a successful render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub ticker: Ticker,
    /// `close` of the last history row.
    pub last_close: f64,
    pub series: PriceSeries,
    /// Carried for structured output only; never part of the view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_quote: Option<LiveQuote>,
}

impl Report {
    pub fn close_price_line(&self) -> String {
        format!("Close Price = ${:.2}", self.last_close)
    }
}

/// Terminal state of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    NoTicker,
    NoData,
    Success(Report),
}

impl RenderOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::NoTicker => "no_ticker",
            Self::NoData => "no_data",
            Self::Success(_) => "success",
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::NoTicker => Some(NO_TICKER_MESSAGE),
            Self::NoData => Some(NO_DATA_MESSAGE),
            Self::Success(_) => None,
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Success(report) => Some(report),
            _ => None,
        }
    }

    /// Page body for this outcome.
    pub fn view(&self) -> Vec<Block> {
        match self {
            Self::NoTicker => vec![Block::text(NO_TICKER_MESSAGE)],
            Self::NoData => vec![Block::text(NO_DATA_MESSAGE)],
            Self::Success(report) => {
                let mut blocks = vec![
                    Block::Subheader(report.ticker.to_string()),
                    Block::strong(report.close_price_line()),
                    Block::Chart(LineChart::adj_close(&report.series)),
                    Block::Subheader(String::from(TIPS_HEADING)),
                ];
                blocks.extend(TIPS.iter().map(|tip| Block::Bullet((*tip).to_owned())));
                blocks
            }
        }
    }
}

/// Runs render passes against one price source.
#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn PriceSource>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    /// Execute one render pass for the current inputs.
    ///
    /// Upstream failures never escape: they are logged and reported as
    /// [`RenderOutcome::NoData`].
    pub async fn run(&self, inputs: &QueryBuilder) -> RenderOutcome {
        let Some(PriceQuery { ticker, range }) = inputs.query() else {
            debug!("no ticker entered");
            return RenderOutcome::NoTicker;
        };

        let started = Instant::now();
        let request = HistoryRequest::new(ticker.clone(), range);
        let series = match self.source.history(request).await {
            Ok(series) => series,
            Err(error) => {
                warn!(
                    source = self.source.id(),
                    ticker = %ticker,
                    range = %range,
                    code = error.code(),
                    error = %error,
                    "history fetch failed"
                );
                PriceSeries::empty(ticker.clone())
            }
        };

        let Some(last_close) = series.last_close() else {
            info!(
                ticker = %ticker,
                range = %range,
                latency_ms = started.elapsed().as_millis() as u64,
                "render: no data"
            );
            return RenderOutcome::NoData;
        };

        let live_quote = if self.options.live_quote {
            self.fetch_live_quote(&ticker).await
        } else {
            None
        };

        info!(
            ticker = %ticker,
            range = %range,
            rows = series.len(),
            last_close,
            latency_ms = started.elapsed().as_millis() as u64,
            "render: success"
        );

        RenderOutcome::Success(Report {
            ticker,
            last_close,
            series,
            live_quote,
        })
    }

    async fn fetch_live_quote(&self, ticker: &Ticker) -> Option<LiveQuote> {
        match self
            .source
            .live_quote(LiveQuoteRequest::new(ticker.clone()))
            .await
        {
            Ok(quote) => Some(quote),
            Err(error) => {
                debug!(ticker = %ticker, error = %error, "live quote unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::view::render_text;
    use crate::PriceRow;

    fn report(closes: &[f64]) -> Report {
        let ticker = Ticker::parse("msft").expect("ticker");
        let rows = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let day = date!(2015 - 01 - 02)
                    .checked_add(time::Duration::days(i as i64))
                    .expect("date");
                PriceRow::close_only(day, *close).expect("row")
            })
            .collect();
        let series = PriceSeries::new(ticker.clone(), rows);
        Report {
            ticker,
            last_close: series.last_close().expect("non-empty"),
            series,
            live_quote: None,
        }
    }

    #[test]
    fn close_price_uses_two_decimals() {
        assert_eq!(report(&[40.0, 40.126]).close_price_line(), "Close Price = $40.13");
        assert_eq!(report(&[7.0]).close_price_line(), "Close Price = $7.00");
        // 40.125 is exact in binary, so the tie rounds to even.
        assert_eq!(report(&[40.125]).close_price_line(), "Close Price = $40.12");
    }

    #[test]
    fn success_view_has_subheader_price_chart_and_tips() {
        let blocks = RenderOutcome::Success(report(&[40.12])).view();

        assert_eq!(blocks.len(), 4 + TIPS.len());
        assert_eq!(blocks[0], Block::Subheader(String::from("MSFT")));
        assert_eq!(blocks[1], Block::strong("Close Price = $40.12"));
        assert!(matches!(&blocks[2], Block::Chart(chart) if chart.len() == 1));
        assert_eq!(blocks[3], Block::Subheader(String::from("Tips:")));
        assert!(blocks[4..].iter().all(|b| matches!(b, Block::Bullet(_))));
    }

    #[test]
    fn message_outcomes_render_exact_text() {
        assert_eq!(
            render_text(&RenderOutcome::NoTicker.view()),
            "Please enter a valid ticker.\n"
        );
        assert_eq!(
            render_text(&RenderOutcome::NoData.view()),
            "No data available for the given ticker and date range.\n"
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(RenderOutcome::NoData).expect("serialize");
        assert_eq!(value["status"], "no_data");

        let value = serde_json::to_value(RenderOutcome::Success(report(&[1.0]))).expect("serialize");
        assert_eq!(value["status"], "success");
        assert_eq!(value["ticker"], "MSFT");
        assert!(value.get("live_quote").is_none());
    }
}
