//! Signal fusion engine.
//!
//! Deterministically combines a price-model prediction, a sentiment
//! reading, and optional raw technical indicators into one trading signal
//! under fixed component weights. This is the single chokepoint
//! guaranteeing every returned signal has a consistent shape and a bounded
//! confidence regardless of upstream provenance.

use chrono::Utc;

use crate::services::indicators::IndicatorSet;
use crate::services::rule_based::MAX_FEATURES;
use crate::types::{
    normalize_features, FeatureWeight, PricePrediction, RiskLevel, SentimentReading,
    SignalAction, TradingSignal, TrendDirection,
};

/// Component weights and decision thresholds for fusion.
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// Weight of the price-prediction model.
    pub price_weight: f64,
    /// Weight of the sentiment reading.
    pub sentiment_weight: f64,
    /// Weight of the raw technical confirmation.
    pub technical_weight: f64,
    /// Combined score above which the decision is BUY/UP.
    pub buy_threshold: f64,
    /// Combined score below which the decision is SELL/DOWN.
    pub sell_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            price_weight: 0.6,
            sentiment_weight: 0.3,
            technical_weight: 0.1,
            buy_threshold: 0.2,
            sell_threshold: -0.2,
        }
    }
}

/// Fused confidence never reports near-certainty: three independent
/// sources compound uncertainty.
const MAX_FUSED_CONFIDENCE: f64 = 95.0;

/// Sentiment class scores closer than this have no clear lean.
const MIXED_SENTIMENT_SPREAD: f64 = 0.2;

/// Weighted fusion of independently sourced signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Combine the three inputs into one `TradingSignal`.
    ///
    /// Pure and deterministic given identical inputs (only the emitted
    /// timestamp varies). Works identically whether the price prediction
    /// came from an external model or the local rule-based path.
    pub fn fuse(
        &self,
        asset: &str,
        prediction: &PricePrediction,
        sentiment: &SentimentReading,
        technical: Option<&IndicatorSet>,
    ) -> TradingSignal {
        let price_score =
            prediction.signal.direction() * prediction.confidence.clamp(0.0, 100.0) / 100.0;
        let sentiment_score = sentiment.label.direction() * sentiment.confidence.clamp(0.0, 1.0);
        let technical_score = technical.map_or(0.0, |set| {
            if set.rsi < 30.0 {
                0.5 // oversold: bullish
            } else if set.rsi > 70.0 {
                -0.5 // overbought: bearish
            } else {
                0.0
            }
        });

        let combined = price_score * self.config.price_weight
            + sentiment_score * self.config.sentiment_weight
            + technical_score * self.config.technical_weight;

        let (signal, trend) = if combined > self.config.buy_threshold {
            (SignalAction::Buy, TrendDirection::Up)
        } else if combined < self.config.sell_threshold {
            (SignalAction::Sell, TrendDirection::Down)
        } else {
            (SignalAction::Hold, TrendDirection::Sideways)
        };

        // Confidence tracks the magnitude of cross-source agreement, not
        // any single source's stated confidence.
        let confidence = (50.0 + combined.abs() * 60.0).min(MAX_FUSED_CONFIDENCE);

        let risk_level = self.assess_risk(prediction.risk_level, sentiment, technical);
        let feature_importance = self.combine_features(&prediction.feature_importance, sentiment);
        let reasoning = self.reasoning(signal, prediction.signal, sentiment, technical);

        TradingSignal {
            asset: asset.to_string(),
            timestamp: Utc::now(),
            signal,
            confidence,
            trend,
            risk_level,
            predicted_price: prediction.predicted_price,
            predicted_range: prediction.predicted_range,
            feature_importance,
            reasoning,
        }
    }

    /// Start from the price model's risk tier, bumped for mixed sentiment
    /// and extreme RSI, then bucketed back to a tier.
    fn assess_risk(
        &self,
        price_risk: RiskLevel,
        sentiment: &SentimentReading,
        technical: Option<&IndicatorSet>,
    ) -> RiskLevel {
        let mut score = price_risk.score();

        if sentiment.scores.spread() < MIXED_SENTIMENT_SPREAD {
            score += 0.5;
        }

        if let Some(set) = technical {
            if set.rsi_extreme() {
                score += 0.5;
            }
        }

        RiskLevel::from_score(score)
    }

    /// Price-model features plus an injected sentiment entry, renormalized
    /// and truncated to the top entries.
    fn combine_features(
        &self,
        price_features: &[FeatureWeight],
        sentiment: &SentimentReading,
    ) -> Vec<FeatureWeight> {
        let mut features = price_features.to_vec();
        if !features.iter().any(|f| f.name == "Sentiment Score") {
            features.push(FeatureWeight::new(
                "Sentiment Score",
                self.config.sentiment_weight * sentiment.confidence,
            ));
        }
        normalize_features(features, MAX_FEATURES)
    }

    /// Templated, reproducible rationale: price part, then sentiment,
    /// then technical.
    fn reasoning(
        &self,
        final_signal: SignalAction,
        price_signal: SignalAction,
        sentiment: &SentimentReading,
        technical: Option<&IndicatorSet>,
    ) -> String {
        let mut parts = Vec::with_capacity(3);

        if price_signal == final_signal {
            parts.push(format!(
                "Price prediction model suggests {}",
                price_signal.label()
            ));
        } else {
            parts.push(format!(
                "Price model shows {} but signal adjusted",
                price_signal.label()
            ));
        }

        parts.push(format!(
            "{} {} market sentiment ({:.0}% confidence)",
            sentiment.strength(),
            sentiment.label.label(),
            sentiment.confidence * 100.0
        ));

        if let Some(set) = technical {
            if set.rsi < 30.0 {
                parts.push("RSI indicates oversold conditions".to_string());
            } else if set.rsi > 70.0 {
                parts.push("RSI indicates overbought conditions".to_string());
            }
        }

        format!("Signal: {}. {}.", final_signal.label(), parts.join(". "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::MacdSet;
    use crate::types::{PriceRange, SentimentLabel, SentimentScores};

    fn prediction(signal: SignalAction, confidence: f64, risk: RiskLevel) -> PricePrediction {
        let trend = match signal {
            SignalAction::Buy => TrendDirection::Up,
            SignalAction::Sell => TrendDirection::Down,
            SignalAction::Hold => TrendDirection::Sideways,
        };
        PricePrediction {
            trend,
            signal,
            confidence,
            predicted_price: 44_500.0,
            predicted_range: PriceRange::new(42_500.0, 46_500.0),
            risk_level: risk,
            feature_importance: vec![
                FeatureWeight::new("Volume", 0.25),
                FeatureWeight::new("RSI", 0.20),
                FeatureWeight::new("MACD", 0.18),
                FeatureWeight::new("Momentum", 0.15),
            ],
            reasoning: "model output".to_string(),
        }
    }

    fn sentiment(label: SentimentLabel, confidence: f64, positive: f64, negative: f64) -> SentimentReading {
        SentimentReading {
            label,
            confidence,
            scores: SentimentScores {
                positive,
                neutral: (1.0 - positive - negative).max(0.0),
                negative,
            },
        }
    }

    fn technicals(rsi: f64) -> IndicatorSet {
        IndicatorSet {
            rsi,
            macd: MacdSet::default(),
            sma_20: 100.0,
            sma_50: 100.0,
            ema_12: 100.0,
            ema_26: 100.0,
            volatility: 2.0,
        }
    }

    #[test]
    fn test_agreeing_sources_buy() {
        let engine = FusionEngine::default();
        let signal = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 75.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Positive, 0.82, 0.82, 0.06),
            Some(&technicals(45.0)),
        );

        assert_eq!(signal.signal, SignalAction::Buy);
        assert_eq!(signal.trend, TrendDirection::Up);
        assert!(signal.confidence > 50.0 && signal.confidence <= 95.0);
        // Spread 0.76 and RSI 45: no risk bump from either.
        assert!(matches!(signal.risk_level, RiskLevel::Low | RiskLevel::Medium));
    }

    #[test]
    fn test_disagreeing_sources_hold() {
        let engine = FusionEngine::default();
        let signal = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 50.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Negative, 0.9, 0.05, 0.9),
            None,
        );
        // 0.6*0.5 - 0.3*0.9 = 0.03: inside the HOLD band.
        assert_eq!(signal.signal, SignalAction::Hold);
        assert_eq!(signal.trend, TrendDirection::Sideways);
        assert!(signal.reasoning.contains("signal adjusted"));
    }

    #[test]
    fn test_bearish_fusion_sells() {
        let engine = FusionEngine::default();
        let signal = engine.fuse(
            "ETH-USD",
            &prediction(SignalAction::Sell, 80.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Negative, 0.7, 0.1, 0.7),
            Some(&technicals(75.0)),
        );
        // -0.6*0.8 - 0.3*0.7 - 0.05 = -0.74: well below the sell threshold.
        assert_eq!(signal.signal, SignalAction::Sell);
        assert_eq!(signal.trend, TrendDirection::Down);
        assert!(signal.reasoning.contains("overbought"));
    }

    #[test]
    fn test_confidence_bounded() {
        let engine = FusionEngine::default();
        let signal = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 100.0, RiskLevel::Low),
            &sentiment(SentimentLabel::Positive, 1.0, 1.0, 0.0),
            Some(&technicals(25.0)),
        );
        assert!(signal.confidence <= 95.0);
        assert!(signal.confidence >= 50.0);
    }

    #[test]
    fn test_mixed_sentiment_bumps_risk() {
        let engine = FusionEngine::default();
        let clear = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 75.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Positive, 0.8, 0.8, 0.1),
            None,
        );
        let mixed = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 75.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Positive, 0.4, 0.4, 0.3),
            None,
        );
        // Monotonic: shrinking the spread never lowers the tier.
        assert!(mixed.risk_level.score() >= clear.risk_level.score());
        assert_eq!(mixed.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_extreme_rsi_bumps_risk() {
        let engine = FusionEngine::default();
        let signal = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 75.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Positive, 0.8, 0.8, 0.1),
            Some(&technicals(85.0)),
        );
        assert_eq!(signal.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_sentiment_feature_injected() {
        let engine = FusionEngine::default();
        let signal = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 75.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Positive, 0.82, 0.82, 0.06),
            None,
        );
        assert!(signal
            .feature_importance
            .iter()
            .any(|f| f.name == "Sentiment Score"));
        let total: f64 = signal.feature_importance.iter().map(|f| f.value).sum();
        assert!((total - 1.0).abs() < 0.01);
        assert!(signal.feature_importance.len() <= 6);
        for pair in signal.feature_importance.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
    }

    #[test]
    fn test_deterministic_apart_from_timestamp() {
        let engine = FusionEngine::default();
        let p = prediction(SignalAction::Buy, 75.0, RiskLevel::Medium);
        let s = sentiment(SentimentLabel::Positive, 0.82, 0.82, 0.06);
        let t = technicals(45.0);

        let a = engine.fuse("BTC-USD", &p, &s, Some(&t));
        let b = engine.fuse("BTC-USD", &p, &s, Some(&t));

        assert_eq!(a.signal, b.signal);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.trend, b.trend);
        assert_eq!(a.risk_level, b.risk_level);
        assert_eq!(a.feature_importance, b.feature_importance);
        assert_eq!(a.reasoning, b.reasoning);
    }

    #[test]
    fn test_reasoning_order_is_fixed() {
        let engine = FusionEngine::default();
        let signal = engine.fuse(
            "BTC-USD",
            &prediction(SignalAction::Buy, 75.0, RiskLevel::Medium),
            &sentiment(SentimentLabel::Positive, 0.82, 0.82, 0.06),
            Some(&technicals(25.0)),
        );
        let price_at = signal.reasoning.find("Price prediction model").unwrap();
        let sentiment_at = signal.reasoning.find("market sentiment").unwrap();
        let technical_at = signal.reasoning.find("oversold").unwrap();
        assert!(price_at < sentiment_at && sentiment_at < technical_at);
    }
}
