//! HTTP client for the external price-prediction model service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::indicators::IndicatorSet;
use crate::sources::PredictionSource;
use crate::types::PricePrediction;

/// Envelope every model-service response is wrapped in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    asset: &'a str,
    features: Vec<Vec<f64>>,
}

/// Client for the model service's prediction endpoint.
pub struct ModelServiceClient {
    client: Client,
    base_url: String,
}

impl ModelServiceClient {
    /// Create a client with the given per-request deadline.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("augur/0.1 (signal fusion pipeline)")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PredictionSource for ModelServiceClient {
    async fn predict(&self, symbol: &str, features: &IndicatorSet) -> Result<PricePrediction> {
        let url = format!("{}/predict/tft", self.base_url);
        debug!("Requesting price prediction: {}", url);

        // One feature row: the current indicator snapshot.
        let body = PredictRequest {
            asset: symbol,
            features: vec![vec![
                features.rsi,
                features.macd.macd,
                features.volatility,
                features.ema_12,
                features.ema_26,
            ]],
        };

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "model service returned {}",
                response.status()
            )));
        }

        let envelope: Envelope<PricePrediction> = response.json().await?;
        match envelope {
            Envelope {
                success: true,
                data: Some(prediction),
            } => Ok(prediction),
            _ => Err(AppError::ExternalApi(
                "model service reported failure".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskLevel, SignalAction, TrendDirection};

    #[test]
    fn test_parse_prediction_envelope() {
        let json = r#"{
            "success": true,
            "data": {
                "trend": "UP",
                "signal": "BUY",
                "confidence": 72.5,
                "predicted_price": 44500.0,
                "predicted_range": {"low": 42500.0, "high": 46500.0},
                "risk_level": "MEDIUM",
                "feature_importance": [
                    {"name": "Volume", "value": 0.25},
                    {"name": "RSI", "value": 0.2}
                ],
                "reasoning": "Model predicts upward trend"
            }
        }"#;
        let envelope: Envelope<PricePrediction> = serde_json::from_str(json).unwrap();
        let prediction = envelope.data.unwrap();
        assert!(envelope.success);
        assert_eq!(prediction.signal, SignalAction::Buy);
        assert_eq!(prediction.trend, TrendDirection::Up);
        assert_eq!(prediction.risk_level, RiskLevel::Medium);
        assert_eq!(prediction.feature_importance.len(), 2);
    }

    #[test]
    fn test_failed_envelope_has_no_data() {
        let json = r#"{"success": false, "data": null}"#;
        let envelope: Envelope<PricePrediction> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
    }
}
