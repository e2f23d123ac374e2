//! Technical indicator calculations.
//!
//! Pure, total functions over a closing-price series. Insufficient history
//! never errors and never produces NaN: every indicator degrades to a
//! well-defined neutral or zero value, because downstream layers treat
//! every field as present and numeric.

use serde::{Deserialize, Serialize};

use crate::types::PriceSeries;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const VOLATILITY_PERIOD: usize = 20;

/// MACD line, signal line, and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdSet {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Snapshot of all computed indicators for one series.
/// Derived value object; recomputed per request, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// RSI(14) in [0, 100]; 50 when history is too short.
    pub rsi: f64,
    pub macd: MacdSet,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    /// Std deviation of trailing 20 percentage returns, as a percentage.
    pub volatility: f64,
}

impl IndicatorSet {
    /// RSI in an extreme band (used for risk scoring).
    pub fn rsi_extreme(&self) -> bool {
        self.rsi < 20.0 || self.rsi > 80.0
    }
}

/// Compute the full indicator set for a price series.
pub fn compute(series: &PriceSeries) -> IndicatorSet {
    let closes = series.closes();
    IndicatorSet {
        rsi: rsi(&closes, RSI_PERIOD),
        macd: macd(&closes),
        sma_20: sma(&closes, 20),
        sma_50: sma(&closes, 50),
        ema_12: ema(&closes, MACD_FAST),
        ema_26: ema(&closes, MACD_SLOW),
        volatility: volatility(&closes, VOLATILITY_PERIOD),
    }
}

/// Relative Strength Index over the trailing `period` deltas.
///
/// Returns the neutral value 50 when fewer than `period + 1` points exist.
/// A window with zero average loss saturates to 100 rather than dividing.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return 50.0;
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for pair in closes[closes.len() - period - 1..].windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gain_sum += change;
        } else {
            loss_sum += -change;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Exponential moving average, seeded from the earliest in-window value.
/// Falls back to the plain mean when fewer than `period` points exist.
pub fn ema(closes: &[f64], period: usize) -> f64 {
    if closes.is_empty() {
        return 0.0;
    }
    if closes.len() < period {
        return closes.iter().sum::<f64>() / closes.len() as f64;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let window = &closes[closes.len() - period..];
    let mut value = window[0];
    for price in &window[1..] {
        value = (price - value) * multiplier + value;
    }
    value
}

/// Trailing simple moving average; averages everything available when the
/// series is shorter than `period`.
pub fn sma(closes: &[f64], period: usize) -> f64 {
    if closes.is_empty() {
        return 0.0;
    }
    let window = &closes[closes.len().saturating_sub(period)..];
    window.iter().sum::<f64>() / window.len() as f64
}

/// MACD line (EMA12 - EMA26), signal line (EMA9 of the MACD line), and
/// histogram. Fewer than 26 points yields the zeroed structure: not enough
/// history means "no signal", not noise.
pub fn macd(closes: &[f64]) -> MacdSet {
    if closes.len() < MACD_SLOW {
        return MacdSet::default();
    }

    // MACD-line series over every prefix long enough for the slow EMA.
    let line_series: Vec<f64> = (MACD_SLOW..=closes.len())
        .map(|end| ema(&closes[..end], MACD_FAST) - ema(&closes[..end], MACD_SLOW))
        .collect();

    let line = *line_series.last().unwrap_or(&0.0);
    let signal = ema(&line_series, MACD_SIGNAL);

    MacdSet {
        macd: line,
        signal,
        histogram: line - signal,
    }
}

/// Volatility: standard deviation of the trailing `period` percentage
/// returns, expressed as a percentage. Needs at least two points, else 0.
pub fn volatility(closes: &[f64], period: usize) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .map(|pair| if pair[0] > 0.0 { (pair[1] - pair[0]) / pair[0] } else { 0.0 })
        .collect();

    let window = &returns[returns.len().saturating_sub(period)..];
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let variance =
        window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / window.len() as f64;

    variance.sqrt() * 100.0
}
