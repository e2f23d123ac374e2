//! Local rule-based predictor.
//!
//! Deterministic threshold rules over the indicator set, used whenever the
//! external model service is unreachable. Always available, never fails,
//! and tags its reasoning so callers can distinguish provenance.

use tracing::debug;

use crate::services::indicators::IndicatorSet;
use crate::types::{
    normalize_features, FeatureWeight, PricePrediction, PriceQuote, PriceRange, RiskLevel,
    SignalAction, TrendDirection,
};

/// Provenance tag appended to every rule-based reasoning string.
pub const FALLBACK_TAG: &str = "(fallback: rule-based)";

/// Maximum entries in an emitted feature-importance list.
pub const MAX_FEATURES: usize = 6;

/// Stateless predictor deriving a complete prediction from indicators alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulePredictor;

impl RulePredictor {
    pub fn new() -> Self {
        Self
    }

    /// Derive trend, signal, confidence, predicted price, and risk from the
    /// indicator set plus the latest quote.
    pub fn predict(&self, indicators: &IndicatorSet, quote: &PriceQuote) -> PricePrediction {
        let mut buy_votes = 0u32;
        let mut sell_votes = 0u32;
        let mut reasons: Vec<String> = Vec::new();

        let rsi = indicators.rsi;
        if rsi < 30.0 {
            buy_votes += 2;
            reasons.push(format!("RSI oversold ({rsi:.1})"));
        } else if rsi < 40.0 {
            buy_votes += 1;
            reasons.push(format!("RSI approaching oversold ({rsi:.1})"));
        } else if rsi > 70.0 {
            sell_votes += 2;
            reasons.push(format!("RSI overbought ({rsi:.1})"));
        } else if rsi > 60.0 {
            sell_votes += 1;
            reasons.push(format!("RSI approaching overbought ({rsi:.1})"));
        }

        if indicators.macd.histogram > 0.0 {
            buy_votes += 1;
            reasons.push("MACD bullish".to_string());
        } else if indicators.macd.histogram < 0.0 {
            sell_votes += 1;
            reasons.push("MACD bearish".to_string());
        }

        if quote.last > indicators.sma_20 {
            buy_votes += 1;
            reasons.push("price above SMA20".to_string());
        } else {
            sell_votes += 1;
            reasons.push("price below SMA20".to_string());
        }

        if indicators.ema_12 > indicators.ema_26 {
            buy_votes += 1;
            reasons.push("EMA12 > EMA26 (bullish cross)".to_string());
        } else {
            sell_votes += 1;
            reasons.push("EMA12 < EMA26 (bearish cross)".to_string());
        }

        let change_pct = quote.change_pct();
        if change_pct > 1.0 {
            buy_votes += 1;
            reasons.push(format!("strong upward momentum (+{change_pct:.1}%)"));
        } else if change_pct < -1.0 {
            sell_votes += 1;
            reasons.push(format!("strong downward momentum ({change_pct:.1}%)"));
        }

        let total = (buy_votes + sell_votes) as f64;
        let margin = buy_votes.abs_diff(sell_votes) as f64;

        let (signal, trend, mut confidence) = if buy_votes > sell_votes + 1 {
            let conf = if total > 0.0 { 50.0 + margin / total * 40.0 } else { 60.0 };
            (SignalAction::Buy, TrendDirection::Up, conf)
        } else if sell_votes > buy_votes + 1 {
            let conf = if total > 0.0 { 50.0 + margin / total * 40.0 } else { 60.0 };
            (SignalAction::Sell, TrendDirection::Down, conf)
        } else {
            let conf = if total > 0.0 { 50.0 + margin / total * 20.0 } else { 55.0 };
            (SignalAction::Hold, TrendDirection::Sideways, conf)
        };

        // High volatility never permits high stated confidence.
        if indicators.volatility > 5.0 {
            confidence = confidence.min(75.0);
        }
        confidence = confidence.min(95.0);

        // Momentum-based point prediction: extrapolate half the last move.
        let momentum = if quote.previous > 0.0 {
            (quote.last - quote.previous) / quote.previous
        } else {
            0.0
        };
        let predicted_price = quote.last * (1.0 + momentum * 0.5);
        let band = indicators.volatility / 100.0 * 2.0;
        let predicted_range =
            PriceRange::new(quote.last * (1.0 - band), quote.last * (1.0 + band));

        let risk_level = Self::assess_risk(rsi, indicators.volatility);

        let features = normalize_features(
            vec![
                FeatureWeight::new("RSI Signal", (rsi - 50.0).abs()),
                FeatureWeight::new("MACD Histogram", indicators.macd.histogram.abs() * 1000.0),
                FeatureWeight::new("Price Momentum", change_pct.abs()),
                FeatureWeight::new("Volatility", indicators.volatility),
                FeatureWeight::new("Moving Avg Cross", 10.0),
            ],
            MAX_FEATURES,
        );

        let summary = reasons
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let reasoning = format!(
            "{} signal based on: {} {}",
            signal.label(),
            summary,
            FALLBACK_TAG
        );

        debug!(
            buy_votes,
            sell_votes, confidence, "rule-based prediction computed"
        );

        PricePrediction {
            trend,
            signal,
            confidence,
            predicted_price,
            predicted_range,
            risk_level,
            feature_importance: features,
            reasoning,
        }
    }

    /// Additive risk scoring: RSI extremes and elevated volatility each
    /// contribute independently, then the total is bucketed.
    fn assess_risk(rsi: f64, volatility: f64) -> RiskLevel {
        let mut score = 0u32;

        if !(25.0..=75.0).contains(&rsi) {
            score += 2;
        } else if !(35.0..=65.0).contains(&rsi) {
            score += 1;
        }

        if volatility > 5.0 {
            score += 2;
        } else if volatility > 3.0 {
            score += 1;
        }

        if score >= 3 {
            RiskLevel::High
        } else if score >= 1 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}
