//! Behavior-driven tests for the Yahoo price source
//!
//! These tests verify HOW the adapter turns chart API answers into price
//! series, live quotes and classified errors.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use time::macros::date;
use tickview_core::{
    DateRange, FixtureHttpClient, HistoryRequest, HttpClient, HttpError, HttpRequest,
    HttpResponse, LiveQuoteRequest, PriceSource, SourceErrorKind, SyntheticYahooClient, Ticker,
    YahooAdapter,
};

const TOKYO_CHART: &str = r#"{"chart":{"result":[{
    "meta":{"currency":"JPY","exchangeName":"JPX","gmtoffset":32400},
    "timestamp":[1420066800,1420153200,1420239600],
    "indicators":{
        "quote":[{"close":[1510.0,null,1525.5],"volume":[100,null,300]}],
        "adjclose":[{"adjclose":[1500.0,null,null]}]}}],"error":null}}"#;

const ONE_ROW: &str = r#"{"chart":{"result":[{"meta":{"gmtoffset":-18000},
    "timestamp":[1420209000],"indicators":{"quote":[{"close":[46.76]}]}}],"error":null}}"#;

fn ticker(raw: &str) -> Ticker {
    Ticker::parse(raw).expect("non-blank ticker")
}

fn history(raw: &str) -> HistoryRequest {
    HistoryRequest::new(
        ticker(raw),
        DateRange::new(date!(2015 - 01 - 01), date!(2015 - 01 - 06)),
    )
}

fn fixture_adapter(client: FixtureHttpClient) -> YahooAdapter {
    YahooAdapter::new(Arc::new(client)).without_session()
}

/// Answers each request with the next scripted response.
struct ScriptedClient {
    responses: Mutex<VecDeque<HttpResponse>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            urls: Mutex::new(Vec::new()),
        }
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("lock").clone()
    }
}

impl HttpClient for ScriptedClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.urls.lock().expect("lock").push(request.url);
        let next = self
            .responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(500, ""));
        Box::pin(async move { Ok(next) })
    }
}

// =============================================================================
// Data Provider: Valid Response Handling
// =============================================================================

#[tokio::test]
async fn when_chart_has_rows_dates_follow_exchange_time_zone() {
    // Given: Tokyo sessions stamped just before midnight UTC
    let adapter =
        fixture_adapter(FixtureHttpClient::new().route("/7203.T?", HttpResponse::ok_json(TOKYO_CHART)));

    // When: History is requested
    let series = adapter.history(history("7203.t")).await.expect("parses");

    // Then: Dates are Tokyo calendar days and the null-close row is gone
    let dates = series.dates().collect::<Vec<_>>();
    assert_eq!(dates, vec![date!(2015 - 01 - 01), date!(2015 - 01 - 03)]);
    assert_eq!(series.rows[0].adj_close, 1500.0);
    assert_eq!(series.rows[1].adj_close, 1525.5, "missing adjclose falls back to close");
    assert_eq!(series.last_close(), Some(1525.5));
}

#[tokio::test]
async fn history_request_uses_utc_midnight_bounds_and_daily_interval() {
    // Given: A recording transport
    let client = Arc::new(FixtureHttpClient::new().route("/chart/", HttpResponse::ok_json(ONE_ROW)));
    let adapter = YahooAdapter::new(client.clone()).without_session();

    // When: History is requested for 2015-01-01..2015-01-06
    adapter.history(history("MSFT")).await.expect("parses");

    // Then: The URL carries both bounds, daily bars and adjusted closes
    let url = &client.recorded_requests()[0].url;
    assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/MSFT?"));
    assert!(url.contains("period1=1420070400&period2=1420502400"));
    assert!(url.contains("interval=1d"));
    assert!(url.contains("includeAdjustedClose=true"));
}

#[tokio::test]
async fn ticker_with_special_characters_is_url_encoded() {
    // Given: A recording transport
    let client = Arc::new(FixtureHttpClient::new().route("/chart/", HttpResponse::ok_json(ONE_ROW)));
    let adapter = YahooAdapter::new(client.clone()).without_session();

    // When: An index ticker is requested
    adapter.history(history("^gspc")).await.expect("parses");

    // Then: The caret is percent-encoded in the path
    assert!(client.recorded_requests()[0].url.contains("/chart/%5EGSPC?"));
}

#[tokio::test]
async fn live_quote_reads_meta_snapshot() {
    // Given: A chart whose meta carries the market snapshot
    let body = r#"{"chart":{"result":[{"meta":{"currency":"usd","exchangeName":"NMS",
        "regularMarketPrice":421.9,"regularMarketTime":1718395200,"chartPreviousClose":418.0}}],"error":null}}"#;
    let adapter = fixture_adapter(FixtureHttpClient::new().route("range=1mo", HttpResponse::ok_json(body)));

    // When: The live quote is requested
    let quote = adapter
        .live_quote(LiveQuoteRequest::new(ticker("msft")))
        .await
        .expect("parses");

    // Then: Price, previous close, currency and time come from meta
    assert_eq!(quote.ticker.as_str(), "MSFT");
    assert_eq!(quote.price, 421.9);
    assert_eq!(quote.currency.as_deref(), Some("USD"));
    assert_eq!(quote.as_of.format_rfc3339(), "2024-06-14T20:00:00Z");
    assert!((quote.change().expect("previous close") - 3.9).abs() < 1e-9);
}

// =============================================================================
// Data Provider: Error Classification
// =============================================================================

#[tokio::test]
async fn chart_error_codes_map_to_source_error_kinds() {
    let cases = [
        (404, "Not Found", SourceErrorKind::NotFound),
        (400, "Bad Request", SourceErrorKind::InvalidRequest),
        (429, "Too Many Requests", SourceErrorKind::RateLimited),
        (500, "Internal Server Error", SourceErrorKind::Unavailable),
    ];

    for (status, code, expected) in cases {
        // Given: Upstream answers with a chart.error object
        let body = format!(
            r#"{{"chart":{{"result":null,"error":{{"code":"{code}","description":"fixture"}}}}}}"#
        );
        let adapter = fixture_adapter(FixtureHttpClient::new().route("/chart/", HttpResponse::new(status, body)));

        // When: History is requested
        let error = adapter.history(history("MSFT")).await.expect_err("must fail");

        // Then: The kind follows the code
        assert_eq!(error.kind(), expected, "code {code}");
    }
}

#[tokio::test]
async fn bare_status_without_json_maps_by_status() {
    let cases = [
        (404, SourceErrorKind::NotFound),
        (429, SourceErrorKind::RateLimited),
        (403, SourceErrorKind::Unavailable),
        (422, SourceErrorKind::InvalidRequest),
        (502, SourceErrorKind::Unavailable),
    ];

    for (status, expected) in cases {
        // Given: An HTML error page
        let adapter = fixture_adapter(
            FixtureHttpClient::new().route("/chart/", HttpResponse::new(status, "<html>error</html>")),
        );

        // When: History is requested
        let error = adapter.history(history("MSFT")).await.expect_err("must fail");

        // Then: The status decides the kind
        assert_eq!(error.kind(), expected, "status {status}");
    }
}

#[tokio::test]
async fn empty_result_list_is_not_found() {
    // Given: A 200 with no result entries
    let adapter = fixture_adapter(
        FixtureHttpClient::new().route("/chart/", HttpResponse::ok_json(r#"{"chart":{"result":[],"error":null}}"#)),
    );

    // When: History is requested
    let error = adapter.history(history("MSFT")).await.expect_err("must fail");

    // Then: Not found
    assert_eq!(error.kind(), SourceErrorKind::NotFound);
    assert_eq!(error.code(), "source.not_found");
}

#[tokio::test]
async fn transport_timeout_is_unavailable() {
    // Given: A transport that times out
    let adapter = fixture_adapter(
        FixtureHttpClient::new().route_error("/chart/", HttpError::timeout("deadline elapsed")),
    );

    // When: History is requested
    let error = adapter.history(history("MSFT")).await.expect_err("must fail");

    // Then: Unavailable, with the timeout in the message
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.message().contains("timed out"));
}

// =============================================================================
// Data Provider: Session
// =============================================================================

#[tokio::test]
async fn rejected_session_is_renewed_once_and_request_succeeds() {
    // Given: consent, crumb, 401, consent, fresh crumb, data
    let client = Arc::new(ScriptedClient::new(vec![
        HttpResponse::new(404, ""),
        HttpResponse::ok_json("old-crumb"),
        HttpResponse::new(401, r#"{"finance":{"error":{"code":"Unauthorized"}}}"#),
        HttpResponse::new(404, ""),
        HttpResponse::ok_json("new-crumb"),
        HttpResponse::ok_json(ONE_ROW),
    ]));
    let adapter = YahooAdapter::new(client.clone());

    // When: History is requested
    let series = adapter.history(history("MSFT")).await.expect("renewed session succeeds");

    // Then: The second chart call used the fresh crumb
    assert_eq!(series.len(), 1);
    let chart_calls = client
        .urls()
        .into_iter()
        .filter(|url| url.contains("/chart/"))
        .collect::<Vec<_>>();
    assert_eq!(chart_calls.len(), 2);
    assert!(chart_calls[0].ends_with("&crumb=old-crumb"));
    assert!(chart_calls[1].ends_with("&crumb=new-crumb"));
}

#[tokio::test]
async fn missing_crumb_does_not_block_the_request() {
    // Given: Both crumb endpoints refuse, the chart answers
    let client = Arc::new(
        FixtureHttpClient::new()
            .route("getcrumb", HttpResponse::new(429, "Too Many Requests"))
            .route("/chart/", HttpResponse::ok_json(ONE_ROW)),
    );
    let adapter = YahooAdapter::new(client.clone());

    // When: History is requested
    let series = adapter.history(history("MSFT")).await.expect("parses");

    // Then: The chart call went out without a crumb
    assert_eq!(series.len(), 1);
    let chart_call = client
        .recorded_requests()
        .into_iter()
        .find(|request| request.url.contains("/chart/"))
        .expect("chart requested");
    assert!(!chart_call.url.contains("crumb="));
}

// =============================================================================
// Data Provider: Offline transport
// =============================================================================

#[tokio::test]
async fn synthetic_transport_rejects_unknown_tickers_like_yahoo() {
    // Given: The offline Yahoo stand-in
    let adapter = YahooAdapter::new(Arc::new(SyntheticYahooClient::new()));

    // When: A ticker outside its catalog is requested
    let error = adapter
        .history(history("ZZZZINVALID"))
        .await
        .expect_err("unknown ticker");

    // Then: Same classification as the real service
    assert_eq!(error.kind(), SourceErrorKind::NotFound);
}

#[tokio::test]
async fn synthetic_transport_rejects_inverted_ranges() {
    // Given: The offline Yahoo stand-in
    let adapter = YahooAdapter::new(Arc::new(SyntheticYahooClient::new()));
    let inverted = HistoryRequest::new(
        ticker("SPY"),
        DateRange::new(date!(2016 - 01 - 01), date!(2015 - 01 - 01)),
    );

    // When: Start is after end
    let error = adapter.history(inverted).await.expect_err("bad range");

    // Then: Invalid request, as Yahoo answers
    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
}
