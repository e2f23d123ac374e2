//! HTTP client for the external sentiment classification service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::sources::SentimentSource;
use crate::types::{SentimentLabel, SentimentReading, SentimentScores};

/// Aggregated per-asset sentiment, as the service reports it.
#[derive(Debug, Deserialize)]
struct AssetSentimentResponse {
    overall_sentiment: SentimentLabel,
    sentiment_score: f64,
    #[serde(default)]
    positive_count: u32,
    #[serde(default)]
    neutral_count: u32,
    #[serde(default)]
    negative_count: u32,
}

impl AssetSentimentResponse {
    /// Per-class scores derived from the article counts; the classifier
    /// only reports counts at the aggregate level.
    fn scores(&self) -> SentimentScores {
        let total = (self.positive_count + self.neutral_count + self.negative_count) as f64;
        if total > 0.0 {
            SentimentScores {
                positive: self.positive_count as f64 / total,
                neutral: self.neutral_count as f64 / total,
                negative: self.negative_count as f64 / total,
            }
        } else {
            SentimentScores::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

/// Client for the sentiment service.
pub struct SentimentServiceClient {
    client: Client,
    base_url: String,
}

impl SentimentServiceClient {
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
impl SentimentSource for SentimentServiceClient {
    async fn asset_sentiment(&self, symbol: &str) -> Result<SentimentReading> {
        let url = format!("{}/sentiment/{}", self.base_url, symbol);
        debug!("Requesting asset sentiment: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "sentiment service returned {}",
                response.status()
            )));
        }

        let data: AssetSentimentResponse = response.json().await?;
        Ok(SentimentReading {
            label: data.overall_sentiment,
            confidence: data.sentiment_score.clamp(0.0, 1.0),
            scores: data.scores(),
        })
    }

    async fn text_sentiment(&self, text: &str) -> Result<SentimentReading> {
        let url = format!("{}/sentiment", self.base_url);
        debug!("Requesting text sentiment: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&TextRequest { text })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "sentiment service returned {}",
                response.status()
            )));
        }

        let envelope: Envelope<SentimentReading> = response.json().await?;
        match envelope {
            Envelope {
                success: true,
                data: Some(reading),
            } => Ok(reading),
            _ => Err(AppError::ExternalApi(
                "sentiment service reported failure".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_sentiment_scores_from_counts() {
        let json = r#"{
            "asset": "BTC-USD",
            "overall_sentiment": "positive",
            "sentiment_score": 0.78,
            "news_analyzed": 10,
            "positive_count": 6,
            "neutral_count": 3,
            "negative_count": 1
        }"#;
        let data: AssetSentimentResponse = serde_json::from_str(json).unwrap();
        let scores = data.scores();
        assert!((scores.positive - 0.6).abs() < 1e-9);
        assert!((scores.negative - 0.1).abs() < 1e-9);
        assert!((scores.spread() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_counts_degrade_to_even_scores() {
        let json = r#"{"overall_sentiment": "neutral", "sentiment_score": 0.5}"#;
        let data: AssetSentimentResponse = serde_json::from_str(json).unwrap();
        assert!(data.scores().spread() < 1e-9);
    }

    #[test]
    fn test_parse_text_sentiment_envelope() {
        let json = r#"{
            "success": true,
            "data": {
                "sentiment": "negative",
                "confidence": 0.81,
                "scores": {"positive": 0.07, "neutral": 0.12, "negative": 0.81}
            }
        }"#;
        let envelope: Envelope<SentimentReading> = serde_json::from_str(json).unwrap();
        let reading = envelope.data.unwrap();
        assert_eq!(reading.label, SentimentLabel::Negative);
        assert!((reading.confidence - 0.81).abs() < 1e-9);
    }
}
