use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp (seconds).
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// Ordered OHLCV history for one symbol.
///
/// Timestamps are strictly increasing; construction rejects duplicates and
/// out-of-order bars. A series may be shorter than any indicator window;
/// the indicator layer degrades rather than erroring.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, validating timestamp ordering.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(AppError::BadRequest(format!(
                    "price series timestamps must be strictly increasing (got {} after {})",
                    pair[1].time, pair[0].time
                )));
            }
        }
        Ok(Self { points })
    }

    /// An empty series (valid: means "no data available").
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Last and previous close, if the series has any data.
    /// A single-bar series reports the same value for both.
    pub fn last_quote(&self) -> Option<PriceQuote> {
        let last = self.points.last()?.close;
        let previous = if self.points.len() > 1 {
            self.points[self.points.len() - 2].close
        } else {
            last
        };
        Some(PriceQuote { last, previous })
    }
}

/// Last and previous closing price for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub last: f64,
    pub previous: f64,
}

impl PriceQuote {
    /// Most recent single-period percentage move.
    pub fn change_pct(&self) -> f64 {
        if self.previous > 0.0 {
            (self.last - self.previous) / self.previous * 100.0
        } else {
            0.0
        }
    }
}
