pub mod price;
pub mod sentiment;
pub mod signal;

pub use price::{PricePoint, PriceQuote, PriceSeries};
pub use sentiment::{SentimentLabel, SentimentReading, SentimentScores};
pub use signal::{
    normalize_features, FeatureWeight, PricePrediction, PriceRange, RiskLevel, SignalAction,
    TradingSignal, TrendDirection,
};
