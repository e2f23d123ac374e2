//! External data sources.
//!
//! The pipeline consumes three collaborators through trait seams so tests
//! and alternate deployments can swap implementations: OHLCV history, a
//! price-prediction model, and a sentiment classifier. Every source may be
//! slow or unavailable; the pipeline owns the deadline and the fallback.

pub mod model_service;
pub mod sentiment_service;
pub mod yahoo;

pub use model_service::ModelServiceClient;
pub use sentiment_service::SentimentServiceClient;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::services::indicators::IndicatorSet;
use crate::types::{PricePrediction, PriceQuote, PriceSeries, SentimentReading};

/// Supplier of OHLCV bars for a symbol.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch daily history covering roughly `lookback_days`.
    /// An empty series is a valid answer meaning "no data".
    async fn fetch_series(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries>;

    /// Last and previous close for a symbol, if known.
    async fn last_quote(&self, symbol: &str) -> Result<Option<PriceQuote>> {
        let series = self.fetch_series(symbol, 5).await?;
        Ok(series.last_quote())
    }
}

/// Supplier of model-based price predictions over a feature window.
/// May be a learned model or a rule-based stand-in; the pipeline must not
/// care which.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    async fn predict(&self, symbol: &str, features: &IndicatorSet) -> Result<PricePrediction>;
}

/// Supplier of sentiment readings, per asset or for free text.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn asset_sentiment(&self, symbol: &str) -> Result<SentimentReading>;

    async fn text_sentiment(&self, text: &str) -> Result<SentimentReading>;
}
