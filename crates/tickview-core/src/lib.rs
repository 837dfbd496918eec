//! # Tickview Core
//!
//! Domain types, the Yahoo price source and the query-and-render pipeline
//! behind the tickview stock tracker.
//!
//! ## Overview
//!
//! A render pass takes three inputs (ticker, start date, end date), fetches
//! the daily history once, and ends in exactly one of three states:
//!
//! - no ticker entered: `"Please enter a valid ticker."`
//! - empty history or upstream failure: `"No data available for the given ticker and date range."`
//! - data: subheader, `Close Price = $X.XX`, an adjusted-close line chart and usage tips
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart adapter and the offline synthetic transport |
//! | [`config`] | Environment configuration |
//! | [`data_source`] | Price source trait and request types |
//! | [`domain`] | Ticker, date range, price rows, live quote |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`pipeline`] | Fetch-and-render pipeline |
//! | [`query`] | Input collection |
//! | [`telemetry`] | Tracing subscriber setup |
//! | [`view`] | Presentation blocks and text rendering |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickview_core::{render_text, Pipeline, QueryBuilder, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let today = time::OffsetDateTime::now_utc().date();
//!     let pipeline = Pipeline::new(Arc::new(YahooAdapter::default()));
//!     let inputs = QueryBuilder::new(today).with_ticker("MSFT");
//!
//!     let outcome = pipeline.run(&inputs).await;
//!     print!("{}", render_text(&outcome.view()));
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Page / CLI      │
//! └────────┬────────┘
//!          │ QueryBuilder
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Pipeline        │────▶│ PriceSource      │
//! │ (one pass)      │     │ (YahooAdapter)   │
//! └────────┬────────┘     └────────┬─────────┘
//!          │ RenderOutcome         │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ View blocks     │     │ HttpClient       │
//! └─────────────────┘     │ (reqwest/offline)│
//!                         └──────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod pipeline;
pub mod query;
pub mod telemetry;
pub mod view;

pub use adapters::{SyntheticYahooClient, YahooAdapter, YahooAuthManager};
pub use config::AppConfig;
pub use data_source::{
    Endpoint, HistoryRequest, LiveQuoteRequest, PriceSource, SourceError, SourceErrorKind,
};
pub use domain::{
    format_date, iso_date, parse_date, DateRange, LiveQuote, PriceRow, PriceSeries, Ticker,
    UtcDateTime, DEFAULT_START_DATE,
};
pub use error::{ConfigError, CoreError, ValidationError};
pub use http_client::{
    FixtureHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use pipeline::{
    Pipeline, PipelineOptions, RenderOutcome, Report, NO_DATA_MESSAGE, NO_TICKER_MESSAGE,
};
pub use query::{PriceQuery, QueryBuilder};
pub use view::{render_text, Block, LineChart, TIPS};
