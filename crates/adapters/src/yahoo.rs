//! Yahoo Finance market data.
//!
//! Pulls OHLCV bars from the unofficial v8 chart API. Yahoo changes the
//! response shape without notice; anything unexpected surfaces as an
//! `ExternalCall` error for that instrument rather than a panic.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Bar, Collaborator, Error, MarketDataSource, Result, Series};

const BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// `MarketDataSource` backed by the Yahoo chart API.
pub struct YahooMarketData {
    http: Client,
    base_url: String,
}

impl YahooMarketData {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at another host serving the same API.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn chart_url(&self, symbol: &str, period: &str, interval: &str) -> String {
        format!(
            "{}/v8/finance/chart/{symbol}?range={period}&interval={interval}",
            self.base_url
        )
    }
}

#[async_trait]
impl MarketDataSource for YahooMarketData {
    async fn fetch(&self, instrument: &str, period: &str, interval: &str) -> Result<Series> {
        let url = self.chart_url(instrument, period, interval);
        debug!(ticker = instrument, %url, "Fetching chart");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        // Yahoo reports unknown symbols as 404 with a JSON error body.
        if !status.is_success() && !body.trim_start().starts_with('{') {
            return Err(Error::Http(format!("HTTP {status}: {body}")));
        }
        parse_chart(instrument, &body)
    }
}

/// Turn a chart API body into a validated series. Rows missing any OHLC value
/// (holidays, halted sessions) are dropped, as are repeated timestamps.
fn parse_chart(symbol: &str, body: &str) -> Result<Series> {
    let resp: ChartResponse = serde_json::from_str(body)?;

    if let Some(err) = resp.chart.error {
        return Err(Error::external(
            Collaborator::MarketData,
            symbol,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let data = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| Error::external(Collaborator::MarketData, symbol, "empty chart result"))?;
    let timestamps = data
        .timestamp
        .ok_or_else(|| Error::external(Collaborator::MarketData, symbol, "no timestamps"))?;
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| Error::external(Collaborator::MarketData, symbol, "no quote data"))?;

    let mut bars: Vec<Bar> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let field = |v: &[Option<f64>]| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
            Error::external(Collaborator::MarketData, symbol, format!("invalid timestamp {ts}"))
        })?;
        if bars.last().is_some_and(|prev| prev.timestamp >= timestamp) {
            continue;
        }
        let bar = Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: field(&quote.volume).unwrap_or(0.0),
        };
        if !bar.is_consistent() {
            debug!(ticker = symbol, ts, "Dropping inconsistent bar");
            continue;
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(Error::external(Collaborator::MarketData, symbol, "no usable bars"));
    }
    Series::new(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600, 1704465000],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, 101.0, null, 102.0],
                        "high":   [101.5, 102.5, null, 103.0],
                        "low":    [ 99.0, 100.5, null, 101.0],
                        "close":  [101.0, 102.0, null, 102.5],
                        "volume": [1000,  1200,  null, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_bars_and_drops_gaps() {
        let series = parse_chart("AAPL", BODY).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().close, 102.5);
        assert_eq!(series.last().volume, 0.0);
        assert_eq!(series.bars()[1].volume, 1200.0);
    }

    #[test]
    fn chart_error_is_external_failure() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("ZZZZ", body).unwrap_err();
        match err {
            Error::ExternalCall { collaborator, instrument, reason } => {
                assert_eq!(collaborator, Collaborator::MarketData);
                assert_eq!(instrument, "ZZZZ");
                assert!(reason.contains("Not Found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_body_is_json_error() {
        assert!(matches!(parse_chart("AAPL", "<html>"), Err(Error::Json(_))));
    }

    #[test]
    fn all_null_rows_yield_error() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800],
            "indicators":{"quote":[{"open":[null],"high":[null],"low":[null],"close":[null],"volume":[null]}]}}],
            "error":null}}"#;
        assert!(matches!(parse_chart("AAPL", body), Err(Error::ExternalCall { .. })));
    }

    #[test]
    fn url_carries_range_and_interval() {
        let client = YahooMarketData::with_base_url("http://localhost:9").unwrap();
        assert_eq!(
            client.chart_url("MSFT", "1mo", "1d"),
            "http://localhost:9/v8/finance/chart/MSFT?range=1mo&interval=1d"
        );
    }
}
