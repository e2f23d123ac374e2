use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trading action for a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    /// Directional score for fusion: BUY=+1, HOLD=0, SELL=-1.
    pub fn direction(&self) -> f64 {
        match self {
            SignalAction::Buy => 1.0,
            SignalAction::Hold => 0.0,
            SignalAction::Sell => -1.0,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
        }
    }
}

/// Predicted trend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

/// Risk tier for a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Internal scalar used for additive risk fusion: LOW=1, MEDIUM=2, HIGH=3.
    pub fn score(&self) -> f64 {
        match self {
            RiskLevel::Low => 1.0,
            RiskLevel::Medium => 2.0,
            RiskLevel::High => 3.0,
        }
    }

    /// Bucket a fused scalar back into a tier: <1.5 LOW, <2.5 MEDIUM, else HIGH.
    pub fn from_score(score: f64) -> Self {
        if score >= 2.5 {
            RiskLevel::High
        } else if score >= 1.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Predicted price band. `low <= high` always holds; the point prediction
/// may legitimately sit outside a momentum-derived band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    /// Build a range, swapping bounds if given in the wrong order.
    pub fn new(low: f64, high: f64) -> Self {
        if low <= high {
            Self { low, high }
        } else {
            Self { low: high, high: low }
        }
    }
}

/// A named feature contribution (non-negative weight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub name: String,
    pub value: f64,
}

impl FeatureWeight {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: value.max(0.0),
        }
    }
}

/// Price-model output. The external model and the local rule-based
/// stand-in both emit this shape; fusion treats them uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    pub trend: TrendDirection,
    pub signal: SignalAction,
    /// Model confidence in [0, 100].
    pub confidence: f64,
    pub predicted_price: f64,
    pub predicted_range: PriceRange,
    pub risk_level: RiskLevel,
    pub feature_importance: Vec<FeatureWeight>,
    pub reasoning: String,
}

/// The fused output entity: one actionable decision per asset.
/// Immutable after construction; a cache update is a full replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub signal: SignalAction,
    /// Fused confidence, clamped to [0, 95].
    pub confidence: f64,
    pub trend: TrendDirection,
    pub risk_level: RiskLevel,
    pub predicted_price: f64,
    pub predicted_range: PriceRange,
    /// At most 6 entries, weights sum to 1, sorted descending.
    pub feature_importance: Vec<FeatureWeight>,
    pub reasoning: String,
}

/// Normalize a feature list so weights sum to 1, sorted descending,
/// truncated to the top `max_entries`. A zero-total list collapses to a
/// single full-weight entry for the first feature.
pub fn normalize_features(mut features: Vec<FeatureWeight>, max_entries: usize) -> Vec<FeatureWeight> {
    let total: f64 = features.iter().map(|f| f.value).sum();
    if total > 0.0 {
        for f in &mut features {
            f.value /= total;
        }
    } else if let Some(first) = features.first_mut() {
        first.value = 1.0;
        features.truncate(1);
    }
    features.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    features.truncate(max_entries);

    // Renormalize after truncation so the emitted list still sums to 1.
    let kept: f64 = features.iter().map(|f| f.value).sum();
    if kept > 0.0 {
        for f in &mut features {
            f.value /= kept;
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&SignalAction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::to_string(&TrendDirection::Sideways).unwrap(),
            "\"SIDEWAYS\""
        );
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
    }

    #[test]
    fn test_risk_score_round_trip() {
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(1.5), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(2.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(2.5), RiskLevel::High);
    }

    #[test]
    fn test_range_orders_bounds() {
        let range = PriceRange::new(110.0, 90.0);
        assert!(range.low <= range.high);
    }

    #[test]
    fn test_feature_weight_clamps_negative() {
        assert_eq!(FeatureWeight::new("x", -0.5).value, 0.0);
    }

    #[test]
    fn test_normalize_features_sums_to_one() {
        let features = vec![
            FeatureWeight::new("a", 3.0),
            FeatureWeight::new("b", 1.0),
            FeatureWeight::new("c", 2.0),
        ];
        let normalized = normalize_features(features, 6);
        let total: f64 = normalized.iter().map(|f| f.value).sum();
        assert!((total - 1.0).abs() < 0.01);
        assert_eq!(normalized[0].name, "a");
        assert_eq!(normalized[2].name, "b");
    }

    #[test]
    fn test_normalize_features_truncates_and_renormalizes() {
        let features = (0..10)
            .map(|i| FeatureWeight::new(format!("f{i}"), 1.0))
            .collect();
        let normalized = normalize_features(features, 6);
        assert_eq!(normalized.len(), 6);
        let total: f64 = normalized.iter().map(|f| f.value).sum();
        assert!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_normalize_zero_total() {
        let features = vec![FeatureWeight::new("only", 0.0)];
        let normalized = normalize_features(features, 6);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].value, 1.0);
    }
}
