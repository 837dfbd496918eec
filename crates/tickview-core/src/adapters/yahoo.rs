use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::Mutex;
use tracing::debug;

use crate::data_source::{Endpoint, HistoryRequest, LiveQuoteRequest, PriceSource, SourceError};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{LiveQuote, PriceRow, PriceSeries, Ticker, UtcDateTime};

pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const YAHOO_REFERER: &str = "https://finance.yahoo.com/";
const YAHOO_CONSENT_URL: &str = "https://fc.yahoo.com";
const YAHOO_CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const CRUMB_TTL: Duration = Duration::from_secs(3600);
const REFUSED_CRUMB_TTL: Duration = Duration::from_secs(60);

// ============================================================================
// Yahoo session - cookie/crumb pair
// ============================================================================

/// `value` is `None` when Yahoo refused a crumb; the refusal is cached too.
#[derive(Debug, Clone)]
struct CachedCrumb {
    value: Option<String>,
    fetched_at: Instant,
}

/// Manages the Yahoo cookie/crumb session.
///
/// Yahoo's unofficial API wants:
/// 1. a session cookie from fc.yahoo.com (kept by the transport's cookie jar)
/// 2. a crumb token from /v1/test/getcrumb, passed as a query parameter
///
/// The lock is held across the refresh so concurrent renders share one fetch.
/// A refusal is remembered for a minute so a blocked session does not put
/// three slow handshake calls in front of every chart request.
#[derive(Debug)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<CachedCrumb>>,
    ttl: Duration,
    refused_ttl: Duration,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            ttl: CRUMB_TTL,
            refused_ttl: REFUSED_CRUMB_TTL,
        }
    }
}

impl YahooAuthManager {
    /// Returns a cached or freshly fetched crumb; `None` when Yahoo refuses one.
    pub async fn crumb(&self, http_client: &dyn HttpClient, timeout_ms: u64) -> Option<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            let ttl = if crumb.value.is_some() {
                self.ttl
            } else {
                self.refused_ttl
            };
            if crumb.fetched_at.elapsed() < ttl {
                return crumb.value.clone();
            }
        }

        let fresh = fetch_crumb(http_client, timeout_ms).await;
        if fresh.is_none() {
            debug!(retry_after_secs = self.refused_ttl.as_secs(), "yahoo refused crumb, going without");
        }
        *cached = Some(CachedCrumb {
            value: fresh.clone(),
            fetched_at: Instant::now(),
        });
        fresh
    }

    /// Drop a held crumb so the next call fetches a new one.
    ///
    /// Returns `false` when there was no crumb to drop; a cached refusal is
    /// kept until it expires.
    pub async fn invalidate(&self) -> bool {
        let mut cached = self.crumb.lock().await;
        if cached.as_ref().is_some_and(|crumb| crumb.value.is_some()) {
            *cached = None;
            true
        } else {
            false
        }
    }
}

async fn fetch_crumb(http_client: &dyn HttpClient, timeout_ms: u64) -> Option<String> {
    // The consent endpoint answers 404 but still sets the session cookie.
    let consent = HttpRequest::get(YAHOO_CONSENT_URL)
        .with_header("referer", YAHOO_REFERER)
        .with_timeout_ms(timeout_ms);
    if let Err(error) = http_client.execute(consent).await {
        debug!(error = %error, "yahoo consent request failed");
    }

    for endpoint in YAHOO_CRUMB_URLS {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", YAHOO_REFERER)
            .with_timeout_ms(timeout_ms);

        match http_client.execute(request).await {
            Ok(response) if response.is_success() => {
                if let Some(crumb) = accept_crumb(&response.body) {
                    return Some(crumb);
                }
            }
            Ok(response) => debug!(status = response.status, endpoint, "yahoo crumb refused"),
            Err(error) => debug!(error = %error, endpoint, "yahoo crumb request failed"),
        }
    }

    None
}

fn accept_crumb(body: &str) -> Option<String> {
    let body = body.trim();
    let looks_like_page = body.contains("<html") || body.contains("<!DOCTYPE");
    let rate_limited = body.to_ascii_lowercase().contains("too many requests");
    if body.is_empty() || body.len() >= 100 || body.contains(' ') || looks_like_page || rate_limited {
        return None;
    }
    Some(body.to_owned())
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance chart API adapter.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth_manager: Arc<YahooAuthManager>,
    base_url: String,
    timeout_ms: u64,
    use_session: bool,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth_manager: Arc::new(YahooAuthManager::default()),
            base_url: String::from(YAHOO_CHART_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_session: true,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Skip the cookie/crumb handshake; chart requests go out bare.
    pub fn without_session(mut self) -> Self {
        self.use_session = false;
        self
    }

    pub fn history_url(&self, req: &HistoryRequest) -> String {
        let (period1, period2) = req.range.unix_bounds();
        format!(
            "{}/{}?period1={period1}&period2={period2}&interval=1d&events=div%2Csplits&includeAdjustedClose=true",
            self.base_url,
            urlencoding::encode(req.ticker.as_str()),
        )
    }

    pub fn live_quote_url(&self, req: &LiveQuoteRequest) -> String {
        format!(
            "{}/{}?range=1mo&interval=1d",
            self.base_url,
            urlencoding::encode(req.ticker.as_str()),
        )
    }

    async fn fetch_chart(
        &self,
        endpoint: Endpoint,
        url: &str,
    ) -> Result<YahooChartResult, SourceError> {
        let response = self.send(endpoint, url).await?;

        // A rejected session gets one more attempt with a fresh crumb.
        let renew = self.use_session
            && matches!(response.status, 401 | 429)
            && self.auth_manager.invalidate().await;
        let response = if renew {
            debug!(%endpoint, status = response.status, "yahoo rejected session, renewing crumb");
            self.send(endpoint, url).await?
        } else {
            response
        };

        decode_chart(&response)
    }

    async fn send(&self, endpoint: Endpoint, url: &str) -> Result<HttpResponse, SourceError> {
        let crumb = if self.use_session {
            self.auth_manager
                .crumb(self.http_client.as_ref(), self.timeout_ms)
                .await
        } else {
            None
        };

        debug!(%endpoint, url, with_crumb = crumb.is_some(), "requesting yahoo chart");
        let full_url = match crumb {
            Some(crumb) => format!("{url}&crumb={}", urlencoding::encode(&crumb)),
            None => url.to_owned(),
        };

        let request = HttpRequest::get(full_url)
            .with_header("referer", YAHOO_REFERER)
            .with_timeout_ms(self.timeout_ms);

        self.http_client
            .execute(request)
            .await
            .map_err(transport_error)
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new(Arc::new(crate::http_client::ReqwestHttpClient::default()))
    }
}

impl PriceSource for YahooAdapter {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.history_url(&req);
            let result = self.fetch_chart(Endpoint::History, &url).await?;
            series_from_chart(req.ticker, result)
        })
    }

    fn live_quote<'a>(
        &'a self,
        req: LiveQuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<LiveQuote, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.live_quote_url(&req);
            let result = self.fetch_chart(Endpoint::LiveQuote, &url).await?;
            live_quote_from_chart(req.ticker, result)
        })
    }
}

// ============================================================================
// Response decoding
// ============================================================================

fn transport_error(error: HttpError) -> SourceError {
    if error.timed_out() {
        SourceError::unavailable(format!("yahoo request timed out: {}", error.message()))
    } else {
        SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
    }
}

fn status_error(status: u16) -> SourceError {
    match status {
        429 => SourceError::rate_limited("yahoo returned status 429"),
        404 => SourceError::not_found("yahoo returned status 404"),
        401 | 403 => SourceError::unavailable(format!("yahoo rejected the session ({status})")),
        400..=499 => SourceError::invalid_request(format!("yahoo returned status {status}")),
        _ => SourceError::unavailable(format!("yahoo returned status {status}")),
    }
}

fn chart_error(error: YahooChartError) -> SourceError {
    let description = error
        .description
        .unwrap_or_else(|| String::from("no description"));
    let message = format!("yahoo chart error {}: {description}", error.code);
    match error.code.as_str() {
        "Not Found" => SourceError::not_found(message),
        "Bad Request" | "Unprocessable Entity" => SourceError::invalid_request(message),
        "Too Many Requests" => SourceError::rate_limited(message),
        _ => SourceError::unavailable(message),
    }
}

fn decode_chart(response: &HttpResponse) -> Result<YahooChartResult, SourceError> {
    let parsed = match serde_json::from_str::<YahooChartResponse>(&response.body) {
        Ok(parsed) => parsed,
        Err(_) if !response.is_success() => return Err(status_error(response.status)),
        Err(error) => {
            return Err(SourceError::internal(format!(
                "failed to parse yahoo chart: {error}"
            )))
        }
    };

    if let Some(error) = parsed.chart.error {
        return Err(chart_error(error));
    }
    if !response.is_success() {
        return Err(status_error(response.status));
    }

    parsed
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found("yahoo chart response has no result"))
}

fn exchange_offset(meta: &YahooChartMeta) -> UtcOffset {
    meta.gmtoffset
        .and_then(|seconds| i32::try_from(seconds).ok())
        .and_then(|seconds| UtcOffset::from_whole_seconds(seconds).ok())
        .unwrap_or(UtcOffset::UTC)
}

fn series_from_chart(ticker: Ticker, result: YahooChartResult) -> Result<PriceSeries, SourceError> {
    // No timestamps means no trading days in the range.
    let Some(timestamps) = result.timestamp else {
        return Ok(PriceSeries::empty(ticker));
    };

    let offset = exchange_offset(&result.meta);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts_value) in timestamps.iter().enumerate() {
        // Rows without a close are holidays or halted sessions.
        let Some(close) = value_at(&quote.close, i) else {
            continue;
        };

        let date = OffsetDateTime::from_unix_timestamp(ts_value)
            .map_err(|e| SourceError::internal(format!("invalid timestamp {ts_value}: {e}")))?
            .to_offset(offset)
            .date();

        let volume = quote
            .volume
            .get(i)
            .copied()
            .flatten()
            .and_then(|v| u64::try_from(v).ok());

        if let Ok(row) = PriceRow::new(
            date,
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            close,
            value_at(&adjclose, i),
            volume,
        ) {
            rows.push(row);
        }
    }

    Ok(PriceSeries::new(ticker, rows))
}

fn live_quote_from_chart(ticker: Ticker, result: YahooChartResult) -> Result<LiveQuote, SourceError> {
    let meta = result.meta;
    let price = meta
        .regular_market_price
        .ok_or_else(|| SourceError::not_found("yahoo chart meta has no regularMarketPrice"))?;

    let as_of = match meta.regular_market_time {
        Some(seconds) => UtcDateTime::from_unix_timestamp(seconds)
            .map_err(|e| SourceError::internal(e.to_string()))?,
        None => UtcDateTime::now(),
    };

    LiveQuote::new(
        ticker,
        price,
        meta.chart_previous_close,
        meta.currency,
        meta.exchange_name,
        as_of,
    )
    .map_err(|e| SourceError::internal(e.to_string()))
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten().filter(|v| v.is_finite())
}

// Yahoo Finance chart API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: YahooChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_name: Option<String>,
    #[serde(default)]
    gmtoffset: Option<i64>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    regular_market_time: Option<i64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Vec<YahooAdjClose>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
