//! Augur - trading signal fusion pipeline.
//!
//! Ingests OHLCV price history and sentiment, computes technical
//! indicators, and fuses price-model output, sentiment, and technical
//! confirmation into one actionable trading signal with confidence, risk
//! tier, predicted range, and human-readable rationale. External sources
//! are optional: every failure path degrades to a deterministic local
//! prediction, so the pipeline always answers.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::{FusionConfig, FusionEngine, IndicatorSet, RulePredictor, SignalPipeline, TtlCache};
pub use types::*;
