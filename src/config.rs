use std::env;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external model service (price prediction + sentiment).
    pub model_service_url: String,
    /// Per-call deadline for outbound requests. One attempt, no retries.
    pub request_timeout: Duration,
    /// TTL for fused trading signals.
    pub signal_cache_ttl: Duration,
    /// TTL for raw price quotes (independent of the signal cache).
    pub quote_cache_ttl: Duration,
    /// Days of daily OHLCV history to request from the market data source.
    pub lookback_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_service_url: "http://localhost:8001".to_string(),
            request_timeout: Duration::from_secs(3),
            signal_cache_ttl: Duration::from_secs(60),
            quote_cache_ttl: Duration::from_secs(30),
            lookback_days: 90,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            model_service_url: env::var("AI_SERVICE_URL")
                .unwrap_or(defaults.model_service_url),
            request_timeout: env_secs("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout),
            signal_cache_ttl: env_secs("SIGNAL_CACHE_TTL_SECS")
                .unwrap_or(defaults.signal_cache_ttl),
            quote_cache_ttl: env_secs("QUOTE_CACHE_TTL_SECS")
                .unwrap_or(defaults.quote_cache_ttl),
            lookback_days: env::var("LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lookback_days),
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.signal_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.quote_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.lookback_days, 90);
    }
}
