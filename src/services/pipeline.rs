//! Signal pipeline: orchestrates indicator computation, the external
//! prediction and sentiment sources, fusion, and the TTL caches.
//!
//! The pipeline always answers. Upstream failures (timeout, error,
//! malformed payload) degrade to the local rule-based predictor; a market
//! data blackout degrades to a conservative HOLD. Only invalid input to
//! the pipeline's own operations is rejected.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::cache::TtlCache;
use crate::services::fusion::{FusionConfig, FusionEngine};
use crate::services::indicators::{self, IndicatorSet};
use crate::services::rule_based::RulePredictor;
use crate::sources::{MarketDataSource, PredictionSource, SentimentSource};
use crate::types::{
    FeatureWeight, PricePrediction, PriceQuote, PriceRange, PriceSeries, RiskLevel,
    SentimentReading, SignalAction, TradingSignal, TrendDirection,
};

/// Minimum text length accepted for sentiment classification.
const MIN_SENTIMENT_TEXT_LEN: usize = 10;

/// The signal fusion pipeline.
///
/// Shared state is limited to the two TTL caches; both are last-write-wins
/// and hold immutable value objects, so concurrent per-asset computations
/// need no coordination.
pub struct SignalPipeline {
    config: Config,
    market: Arc<dyn MarketDataSource>,
    predictions: Arc<dyn PredictionSource>,
    sentiment: Arc<dyn SentimentSource>,
    fusion: FusionEngine,
    rules: RulePredictor,
    signal_cache: TtlCache<TradingSignal>,
    quote_cache: TtlCache<PriceQuote>,
}

impl SignalPipeline {
    /// Create a pipeline with default fusion weights.
    pub fn new(
        config: Config,
        market: Arc<dyn MarketDataSource>,
        predictions: Arc<dyn PredictionSource>,
        sentiment: Arc<dyn SentimentSource>,
    ) -> Self {
        Self::with_fusion(config, market, predictions, sentiment, FusionConfig::default())
    }

    /// Create a pipeline with custom fusion weights/thresholds.
    pub fn with_fusion(
        config: Config,
        market: Arc<dyn MarketDataSource>,
        predictions: Arc<dyn PredictionSource>,
        sentiment: Arc<dyn SentimentSource>,
        fusion: FusionConfig,
    ) -> Self {
        let signal_cache = TtlCache::new(config.signal_cache_ttl);
        let quote_cache = TtlCache::new(config.quote_cache_ttl);
        Self {
            config,
            market,
            predictions,
            sentiment,
            fusion: FusionEngine::new(fusion),
            rules: RulePredictor::new(),
            signal_cache,
            quote_cache,
        }
    }

    /// Get the trading signal for one asset, computing it if no live
    /// cache entry exists.
    pub async fn get_signal(&self, asset: &str) -> Result<TradingSignal> {
        let symbol = validate_symbol(asset)?;

        if let Some(hit) = self.signal_cache.get(&symbol) {
            debug!(%symbol, "signal cache hit");
            return Ok(hit);
        }

        let signal = self.compute_signal(&symbol).await;
        self.signal_cache.put(symbol, signal.clone());
        Ok(signal)
    }

    /// Signals for many assets, fanned out concurrently. Per-asset source
    /// failures never cross over; rejected symbols are logged and skipped.
    pub async fn get_signals(&self, assets: &[String]) -> Vec<TradingSignal> {
        let results = join_all(assets.iter().map(|asset| self.get_signal(asset))).await;
        results
            .into_iter()
            .zip(assets)
            .filter_map(|(result, asset)| match result {
                Ok(signal) => Some(signal),
                Err(e) => {
                    warn!(%asset, error = %e, "skipping asset in batch");
                    None
                }
            })
            .collect()
    }

    /// Direct fusion entry point for callers already holding fresh inputs.
    /// Bypasses orchestration and the cache.
    pub fn fuse(
        &self,
        asset: &str,
        prediction: &PricePrediction,
        sentiment: &SentimentReading,
        technical: Option<&IndicatorSet>,
    ) -> Result<TradingSignal> {
        let symbol = validate_symbol(asset)?;
        Ok(self.fusion.fuse(&symbol, prediction, sentiment, technical))
    }

    /// Last/previous close for a symbol, served from the quote cache when
    /// live.
    pub async fn last_quote(&self, asset: &str) -> Result<Option<PriceQuote>> {
        let symbol = validate_symbol(asset)?;
        if let Some(hit) = self.quote_cache.get(&symbol) {
            return Ok(Some(hit));
        }
        let quote = self.market.last_quote(&symbol).await?;
        if let Some(q) = quote {
            self.quote_cache.put(symbol, q);
        }
        Ok(quote)
    }

    /// Classify free text via the sentiment source.
    pub async fn analyze_text(&self, text: &str) -> Result<SentimentReading> {
        if text.trim().len() < MIN_SENTIMENT_TEXT_LEN {
            return Err(AppError::BadRequest(
                "text too short for sentiment analysis".to_string(),
            ));
        }
        match tokio::time::timeout(
            self.config.request_timeout,
            self.sentiment.text_sentiment(text),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::ExternalApi(
                "sentiment service timed out".to_string(),
            )),
        }
    }

    /// Compute a fresh signal: indicators, then external sources under a
    /// deadline, then fusion, or the rule-based fallback when a source
    /// is unavailable.
    async fn compute_signal(&self, symbol: &str) -> TradingSignal {
        let series = self.fetch_series(symbol).await;

        let quote = match series.last_quote() {
            Some(q) => q,
            None => {
                warn!(%symbol, "no market data; emitting conservative HOLD");
                return self.unavailable_signal(symbol);
            }
        };
        self.quote_cache.put(symbol.to_string(), quote);

        let set = indicators::compute(&series);

        let prediction = self.fetch_prediction(symbol, &set).await;
        let sentiment = self.fetch_sentiment(symbol).await;

        match (prediction, sentiment) {
            (Some(p), Some(s)) => self.fusion.fuse(symbol, &p, &s, Some(&set)),
            _ => {
                warn!(%symbol, "external sources unavailable; using rule-based fallback");
                let p = self.rules.predict(&set, &quote);
                Self::signal_from_prediction(symbol, p)
            }
        }
    }

    async fn fetch_series(&self, symbol: &str) -> PriceSeries {
        match tokio::time::timeout(
            self.config.request_timeout,
            self.market.fetch_series(symbol, self.config.lookback_days),
        )
        .await
        {
            Ok(Ok(series)) => series,
            Ok(Err(e)) => {
                warn!(%symbol, error = %e, "market data source failed");
                PriceSeries::empty()
            }
            Err(_) => {
                warn!(%symbol, "market data source timed out");
                PriceSeries::empty()
            }
        }
    }

    /// One bounded attempt; timeouts and errors are treated identically.
    async fn fetch_prediction(&self, symbol: &str, set: &IndicatorSet) -> Option<PricePrediction> {
        match tokio::time::timeout(
            self.config.request_timeout,
            self.predictions.predict(symbol, set),
        )
        .await
        {
            Ok(Ok(prediction)) => Some(prediction),
            Ok(Err(e)) => {
                warn!(%symbol, error = %e, "prediction source failed");
                None
            }
            Err(_) => {
                warn!(%symbol, "prediction source timed out");
                None
            }
        }
    }

    async fn fetch_sentiment(&self, symbol: &str) -> Option<SentimentReading> {
        match tokio::time::timeout(
            self.config.request_timeout,
            self.sentiment.asset_sentiment(symbol),
        )
        .await
        {
            Ok(Ok(reading)) => Some(reading),
            Ok(Err(e)) => {
                warn!(%symbol, error = %e, "sentiment source failed");
                None
            }
            Err(_) => {
                warn!(%symbol, "sentiment source timed out");
                None
            }
        }
    }

    /// Wrap a complete prediction (rule-based path) into the output shape.
    fn signal_from_prediction(symbol: &str, prediction: PricePrediction) -> TradingSignal {
        TradingSignal {
            asset: symbol.to_string(),
            timestamp: Utc::now(),
            signal: prediction.signal,
            confidence: prediction.confidence.clamp(0.0, 95.0),
            trend: prediction.trend,
            risk_level: prediction.risk_level,
            predicted_price: prediction.predicted_price,
            predicted_range: prediction.predicted_range,
            feature_importance: prediction.feature_importance,
            reasoning: prediction.reasoning,
        }
    }

    /// Conservative HOLD when there is no market data at all. Anchored to
    /// the last cached quote when one exists.
    fn unavailable_signal(&self, symbol: &str) -> TradingSignal {
        let last = self
            .quote_cache
            .get(symbol)
            .map(|q| q.last)
            .unwrap_or(0.0);
        TradingSignal {
            asset: symbol.to_string(),
            timestamp: Utc::now(),
            signal: SignalAction::Hold,
            confidence: 55.0,
            trend: TrendDirection::Sideways,
            risk_level: RiskLevel::Medium,
            predicted_price: last,
            predicted_range: PriceRange::new(last * 0.95, last * 1.05),
            feature_importance: vec![FeatureWeight::new("Data Unavailable", 1.0)],
            reasoning: "Market data temporarily unavailable. Using conservative HOLD signal."
                .to_string(),
        }
    }
}

/// Validate and normalize an asset symbol: uppercase, 1-15 chars,
/// alphanumeric plus '-', '.', '^'.
fn validate_symbol(asset: &str) -> Result<String> {
    let symbol = asset.trim().to_uppercase();
    let valid_len = (1..=15).contains(&symbol.len());
    let valid_chars = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '^'));
    if !valid_len || !valid_chars {
        return Err(AppError::BadRequest(format!(
            "invalid asset symbol: {asset:?}"
        )));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_symbol_normalizes() {
        assert_eq!(validate_symbol(" btc-usd ").unwrap(), "BTC-USD");
        assert_eq!(validate_symbol("brk.b").unwrap(), "BRK.B");
    }

    #[test]
    fn test_validate_symbol_rejects_garbage() {
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("   ").is_err());
        assert!(validate_symbol("BTC$USD").is_err());
        assert!(validate_symbol("THIS-SYMBOL-IS-FAR-TOO-LONG").is_err());
    }
}
