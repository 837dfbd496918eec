//! Price source trait and request/response types.
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | History | [`HistoryRequest`] | [`PriceSeries`] | Daily rows over a date range |
//! | Live quote | [`LiveQuoteRequest`] | [`LiveQuote`] | Latest trading snapshot |
//!
//! # Example
//!
//! ```rust,ignore
//! use tickview_core::{HistoryRequest, PriceSource, YahooAdapter};
//!
//! async fn last_close(adapter: &YahooAdapter, req: HistoryRequest) -> Option<f64> {
//!     adapter.history(req).await.ok()?.last_close()
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DateRange, LiveQuote, PriceSeries, Ticker};

/// Upstream endpoint, used in error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    History,
    LiveQuote,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::LiveQuote => "live_quote",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure, timeout or 5xx.
    Unavailable,
    RateLimited,
    /// The provider reported that it has nothing for the ticker.
    NotFound,
    InvalidRequest,
    /// Malformed or unexpected response body.
    Internal,
}

/// Structured source error.
///
/// The pipeline folds every kind into the same "no data" outcome; the kind
/// only matters for logs and structured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub ticker: Ticker,
    pub range: DateRange,
}

impl HistoryRequest {
    pub fn new(ticker: Ticker, range: DateRange) -> Self {
        Self { ticker, range }
    }
}

/// Request payload for the live quote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveQuoteRequest {
    pub ticker: Ticker,
}

impl LiveQuoteRequest {
    pub fn new(ticker: Ticker) -> Self {
        Self { ticker }
    }
}

/// Price provider contract.
///
/// Implementations must be `Send + Sync`: the web server shares one source
/// across request tasks.
pub trait PriceSource: Send + Sync {
    /// Short provider name for logs.
    fn id(&self) -> &'static str;

    /// Fetches daily rows for the request range.
    ///
    /// An empty series is a valid answer. The range is forwarded as given,
    /// including inverted and single-day ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unreachable, answers
    /// with an error status or payload, or the body cannot be parsed.
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;

    /// Fetches the latest trading snapshot.
    ///
    /// # Errors
    ///
    /// Same conditions as [`history`](PriceSource::history).
    fn live_quote<'a>(
        &'a self,
        req: LiveQuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<LiveQuote, SourceError>> + Send + 'a>>;
}
