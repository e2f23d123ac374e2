use serde::{Deserialize, Serialize};

/// Sentiment classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Directional score for fusion: positive=+1, neutral=0, negative=-1.
    pub fn direction(&self) -> f64 {
        match self {
            SentimentLabel::Positive => 1.0,
            SentimentLabel::Neutral => 0.0,
            SentimentLabel::Negative => -1.0,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

/// Per-class confidence scores; sums to 1 within rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl Default for SentimentScores {
    /// Even split when the classifier reports no per-class breakdown.
    fn default() -> Self {
        Self {
            positive: 1.0 / 3.0,
            neutral: 1.0 / 3.0,
            negative: 1.0 / 3.0,
        }
    }
}

impl SentimentScores {
    /// Distance between the positive and negative class scores.
    /// A small spread means the classifier has no clear lean.
    pub fn spread(&self) -> f64 {
        (self.positive - self.negative).abs()
    }
}

/// Sentiment output from the classifier (or a stand-in).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    #[serde(rename = "sentiment")]
    pub label: SentimentLabel,
    /// Confidence of the winning class, in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub scores: SentimentScores,
}

impl SentimentReading {
    /// Qualitative strength descriptor used in reasoning text.
    pub fn strength(&self) -> &'static str {
        if self.confidence > 0.7 {
            "strong"
        } else if self.confidence > 0.5 {
            "moderate"
        } else {
            "weak"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_direction() {
        assert_eq!(SentimentLabel::Positive.direction(), 1.0);
        assert_eq!(SentimentLabel::Neutral.direction(), 0.0);
        assert_eq!(SentimentLabel::Negative.direction(), -1.0);
    }

    #[test]
    fn test_default_scores_have_zero_spread() {
        let scores = SentimentScores::default();
        assert!(scores.spread() < 1e-9);
        let total = scores.positive + scores.neutral + scores.negative;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_strength_thresholds() {
        let mut reading = SentimentReading {
            label: SentimentLabel::Positive,
            confidence: 0.82,
            scores: SentimentScores::default(),
        };
        assert_eq!(reading.strength(), "strong");
        reading.confidence = 0.6;
        assert_eq!(reading.strength(), "moderate");
        reading.confidence = 0.4;
        assert_eq!(reading.strength(), "weak");
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{"sentiment":"negative","confidence":0.8,"scores":{"positive":0.1,"neutral":0.1,"negative":0.8}}"#;
        let reading: SentimentReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.label, SentimentLabel::Negative);
        assert!((reading.scores.spread() - 0.7).abs() < 1e-9);
    }
}
