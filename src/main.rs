//! Demo binary: compute fused trading signals for a list of symbols and
//! print them as JSON. Symbols come from the command line, or a default
//! major-asset universe when none are given.

use std::sync::Arc;

use augur::config::Config;
use augur::services::SignalPipeline;
use augur::sources::{ModelServiceClient, SentimentServiceClient, YahooFinanceClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SYMBOLS: &[&str] = &[
    "BTC-USD", "ETH-USD", "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "XAU-USD",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Starting signal pipeline (model service: {})",
        config.model_service_url
    );

    let market = Arc::new(YahooFinanceClient::new(config.request_timeout)?);
    let predictions = Arc::new(ModelServiceClient::new(
        config.model_service_url.clone(),
        config.request_timeout,
    )?);
    let sentiment = Arc::new(SentimentServiceClient::new(
        config.model_service_url.clone(),
        config.request_timeout,
    )?);

    let pipeline = SignalPipeline::new(config, market, predictions, sentiment);

    let symbols: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
        } else {
            args
        }
    };

    info!("Computing signals for {} symbols", symbols.len());
    let signals = pipeline.get_signals(&symbols).await;

    println!("{}", serde_json::to_string_pretty(&signals)?);
    Ok(())
}
