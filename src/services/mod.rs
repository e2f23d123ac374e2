//! Core pipeline services: indicator math, TTL caching, rule-based
//! fallback, signal fusion, and the orchestrating pipeline.

pub mod cache;
pub mod fusion;
pub mod indicators;
pub mod pipeline;
pub mod rule_based;

pub use cache::TtlCache;
pub use fusion::{FusionConfig, FusionEngine};
pub use indicators::{IndicatorSet, MacdSet};
pub use pipeline::SignalPipeline;
pub use rule_based::{RulePredictor, FALLBACK_TAG};
