//! Offline stand-in for the Yahoo chart API.
//!
//! Answers chart URLs for a small catalog with deterministic daily rows so
//! the page and the CLI can run without network access. Unknown tickers get
//! the same 404 payload Yahoo returns for delisted symbols.

use std::future::Future;
use std::pin::Pin;

use serde_json::{json, Value};
use time::{OffsetDateTime, Weekday};

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

const CATALOG: [(&str, &str); 6] = [
    ("AAPL", "NMS"),
    ("GOOGL", "NMS"),
    ("MSFT", "NMS"),
    ("NVDA", "NMS"),
    ("QQQ", "NMS"),
    ("SPY", "PCX"),
];

/// New York standard time, as Yahoo reports it for US listings.
const GMT_OFFSET: i64 = -18_000;
/// 09:30 New York in seconds after midnight UTC.
const SESSION_OPEN_UTC: i64 = 14 * 3600 + 30 * 60;
const SESSION_LENGTH: i64 = 6 * 3600 + 30 * 60;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticYahooClient;

impl SyntheticYahooClient {
    pub fn new() -> Self {
        Self
    }

    fn respond(&self, url: &str) -> HttpResponse {
        if url.contains("getcrumb") {
            return HttpResponse::ok_json("synthetic-crumb");
        }
        let Some((ticker, query)) = split_chart_url(url) else {
            return HttpResponse::new(404, "");
        };
        let Some(exchange) = CATALOG
            .iter()
            .find(|(symbol, _)| *symbol == ticker)
            .map(|(_, exchange)| *exchange)
        else {
            return HttpResponse::new(404, not_found_body().to_string());
        };

        let (period1, period2) = match (query_param(query, "period1"), query_param(query, "period2")) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => {
                // range=1mo
                let today = OffsetDateTime::now_utc().unix_timestamp();
                (today - 30 * SECONDS_PER_DAY, today)
            }
        };

        if period1 > period2 {
            return HttpResponse::new(400, bad_range_body(period1, period2).to_string());
        }

        HttpResponse::ok_json(chart_body(&ticker, exchange, period1, period2).to_string())
    }
}

impl HttpClient for SyntheticYahooClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.respond(&request.url);
        Box::pin(async move { Ok(response) })
    }
}

fn split_chart_url(url: &str) -> Option<(String, &str)> {
    let (_, rest) = url.split_once("/chart/")?;
    let (raw_ticker, query) = rest.split_once('?').unwrap_or((rest, ""));
    let ticker = urlencoding::decode(raw_ticker).ok()?.into_owned();
    Some((ticker, query))
}

fn query_param(query: &str, name: &str) -> Option<i64> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.parse().ok())
}

fn ticker_seed(ticker: &str) -> u64 {
    ticker.bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

/// Weekday sessions in `[period1, period2)`.
fn session_timestamps(period1: i64, period2: i64) -> Vec<i64> {
    let first_day = period1.div_euclid(SECONDS_PER_DAY);
    let last_day = period2.div_euclid(SECONDS_PER_DAY);
    (first_day..last_day)
        .map(|day| day * SECONDS_PER_DAY + SESSION_OPEN_UTC)
        .filter(|&ts| ts >= period1 && ts < period2)
        .filter(|&ts| {
            OffsetDateTime::from_unix_timestamp(ts)
                .map(|dt| !matches!(dt.weekday(), Weekday::Saturday | Weekday::Sunday))
                .unwrap_or(false)
        })
        .collect()
}

fn chart_body(ticker: &str, exchange: &str, period1: i64, period2: i64) -> Value {
    let seed = ticker_seed(ticker);
    let timestamps = session_timestamps(period1, period2);
    let base = 40.0 + (seed % 400) as f64;

    let closes = timestamps
        .iter()
        .map(|ts| {
            let day = ts.div_euclid(SECONDS_PER_DAY) as u64;
            let wave = ((day.wrapping_add(seed) % 60) as f64 - 30.0) / 10.0;
            let drift = (day % 3650) as f64 / 40.0;
            round2(base + drift + wave)
        })
        .collect::<Vec<_>>();
    let opens = closes.iter().map(|c| round2(c - 0.35)).collect::<Vec<_>>();
    let highs = closes.iter().map(|c| round2(c + 0.80)).collect::<Vec<_>>();
    let lows = closes.iter().map(|c| round2(c - 0.90)).collect::<Vec<_>>();
    let adjcloses = closes.iter().map(|c| round2(c * 0.97)).collect::<Vec<_>>();
    let volumes = (0..timestamps.len())
        .map(|i| 20_000_000 + (seed % 5_000) * 1_000 + i as u64 * 25)
        .collect::<Vec<_>>();

    let last_close = closes.last().copied().unwrap_or(base);
    let previous_close = closes.first().copied().unwrap_or(base);
    let regular_market_time = timestamps
        .last()
        .map(|ts| ts + SESSION_LENGTH)
        .unwrap_or(period2);

    let mut result = json!({
        "meta": {
            "currency": "USD",
            "symbol": ticker,
            "exchangeName": exchange,
            "gmtoffset": GMT_OFFSET,
            "regularMarketPrice": last_close,
            "regularMarketTime": regular_market_time,
            "chartPreviousClose": previous_close,
        },
        "indicators": {
            "quote": [{
                "open": opens,
                "high": highs,
                "low": lows,
                "close": closes,
                "volume": volumes,
            }],
            "adjclose": [{ "adjclose": adjcloses }],
        },
    });
    if !timestamps.is_empty() {
        result["timestamp"] = json!(timestamps);
    }

    json!({ "chart": { "result": [result], "error": null } })
}

fn not_found_body() -> Value {
    json!({
        "chart": {
            "result": null,
            "error": {
                "code": "Not Found",
                "description": "No data found, symbol may be delisted",
            },
        }
    })
}

fn bad_range_body(period1: i64, period2: i64) -> Value {
    json!({
        "chart": {
            "result": null,
            "error": {
                "code": "Bad Request",
                "description": format!(
                    "Invalid input - start date cannot be after end date. startDate = {period1}, endDate = {period2}"
                ),
            },
        }
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_skip_weekends_and_exclude_end() {
        // 2015-01-01 (Thu) .. 2015-01-06 (Tue), end exclusive
        let sessions = session_timestamps(1_420_070_400, 1_420_502_400);
        assert_eq!(sessions, vec![1_420_122_600, 1_420_209_000, 1_420_468_200]);
    }

    #[test]
    fn single_day_range_has_no_sessions() {
        assert!(session_timestamps(1_420_070_400, 1_420_070_400).is_empty());
    }

    #[test]
    fn unknown_ticker_gets_yahoo_not_found_payload() {
        let response = SyntheticYahooClient::new()
            .respond("https://x.test/v8/finance/chart/ZZZZINVALID?period1=0&period2=86400");
        assert_eq!(response.status, 404);
        assert!(response.body.contains("Not Found"));
    }

    #[test]
    fn known_ticker_is_deterministic() {
        let client = SyntheticYahooClient::new();
        let url = "https://x.test/v8/finance/chart/MSFT?period1=1420070400&period2=1420502400";
        let first = client.respond(url);
        let second = client.respond(url);
        assert_eq!(first.status, 200);
        assert_eq!(first.body, second.body);
    }
}
