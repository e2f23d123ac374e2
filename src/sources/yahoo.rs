//! Yahoo Finance API client for historical OHLCV data.
//!
//! Uses the unofficial chart endpoint; no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::sources::MarketDataSource;
use crate::types::{PricePoint, PriceSeries};

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Normalize symbol for Yahoo Finance.
/// Yahoo uses hyphens instead of dots for share classes (BRK-B, not BRK.B).
fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Map a lookback in days to the nearest Yahoo range string.
fn range_for_days(days: u32) -> &'static str {
    match days {
        0..=5 => "5d",
        6..=30 => "1mo",
        31..=90 => "3mo",
        91..=180 => "6mo",
        181..=365 => "1y",
        _ => "2y",
    }
}

/// Yahoo Finance chart API client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a client with the given per-request deadline.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch_series(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries> {
        let yahoo_symbol = normalize_symbol(symbol);
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval=1d&includePrePost=false",
            yahoo_symbol,
            range_for_days(lookback_days),
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Yahoo Finance returned {}",
                response.status()
            )));
        }

        let data: ChartResponse = response.json().await?;

        if let Some(error) = data.chart.error {
            return Err(AppError::ExternalApi(format!(
                "Yahoo Finance error {}: {}",
                error.code, error.description
            )));
        }

        let result = match data.chart.result.and_then(|mut r| r.pop()) {
            Some(r) => r,
            None => return Ok(PriceSeries::empty()),
        };

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = match result.indicators.quote.into_iter().next() {
            Some(q) => q,
            None => return Ok(PriceSeries::empty()),
        };

        let opens = quote.open.unwrap_or_default();
        let highs = quote.high.unwrap_or_default();
        let lows = quote.low.unwrap_or_default();
        let closes = quote.close.unwrap_or_default();
        let volumes = quote.volume.unwrap_or_default();

        // Bars with null fields (halts, partial sessions) are skipped, as
        // are any out-of-order timestamps the API occasionally emits.
        let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
        for (i, &time) in timestamps.iter().enumerate() {
            let (open, high, low, close) = match (
                opens.get(i).copied().flatten(),
                highs.get(i).copied().flatten(),
                lows.get(i).copied().flatten(),
                closes.get(i).copied().flatten(),
            ) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => continue,
            };
            if points.last().is_some_and(|p: &PricePoint| p.time >= time) {
                continue;
            }
            points.push(PricePoint {
                time,
                open,
                high,
                low,
                close,
                volume: volumes.get(i).copied().flatten(),
            });
        }

        PriceSeries::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("brk.b"), "BRK-B");
        assert_eq!(normalize_symbol("BTC-USD"), "BTC-USD");
    }

    #[test]
    fn test_range_for_days() {
        assert_eq!(range_for_days(3), "5d");
        assert_eq!(range_for_days(90), "3mo");
        assert_eq!(range_for_days(400), "2y");
    }

    #[test]
    fn test_parse_chart_response() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1, 2, 3],
                    "indicators": {
                        "quote": [{
                            "open": [1.0, 2.0, null],
                            "high": [1.5, 2.5, 3.5],
                            "low": [0.5, 1.5, 2.5],
                            "close": [1.2, 2.2, 3.2],
                            "volume": [100.0, null, 300.0]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(json).unwrap();
        let result = &parsed.chart.result.as_ref().unwrap()[0];
        assert_eq!(result.timestamp.as_ref().unwrap().len(), 3);
    }
}
