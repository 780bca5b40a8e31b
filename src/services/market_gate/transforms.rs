//! Technical transforms over plain close/volume series.
//!
//! All functions are pure and total: degenerate input yields a neutral
//! value instead of an error.

/// Default ATR lookback.
pub const ATR_PERIOD: usize = 14;
/// Default z-score window.
pub const Z_SCORE_WINDOW: usize = 50;
/// Default slope lookback.
pub const SLOPE_LOOKBACK: usize = 20;

/// ATR% reported when there is not enough history.
pub const ATR_FALLBACK_PERCENT: f64 = 3.0;

/// Half-width of the synthetic high/low band around each close.
const SYNTHETIC_RANGE: f64 = 0.02;

/// Exponential moving average over the whole series.
///
/// The first output is seeded with the first input (not an SMA), so
/// `ema(s, p)[0] == s[0]` for every period.
pub fn ema(series: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = series.first() else {
        return Vec::new();
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    out.push(first);

    let mut prev = first;
    for &value in &series[1..] {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }

    out
}

/// Average true range as a percentage of the latest close.
///
/// Only closes are available, so each bar's high/low is approximated as
/// close ±2%. TR = max(high-low, |high-prevClose|, |low-prevClose|).
pub fn atr_percent(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return ATR_FALLBACK_PERCENT;
    }

    let true_ranges: Vec<f64> = prices
        .windows(2)
        .map(|w| {
            let (prev_close, close) = (w[0], w[1]);
            let high = close * (1.0 + SYNTHETIC_RANGE);
            let low = close * (1.0 - SYNTHETIC_RANGE);
            let hl = high - low;
            let hc = (high - prev_close).abs();
            let lc = (low - prev_close).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    let recent = &true_ranges[true_ranges.len() - period..];
    let atr = recent.iter().sum::<f64>() / period as f64;

    let current = prices[prices.len() - 1];
    if current == 0.0 {
        return ATR_FALLBACK_PERCENT;
    }

    (atr / current) * 100.0
}

/// Z-score of the last element against the trailing `window` elements.
///
/// Uses the population standard deviation. Returns 0 when the series is
/// shorter than the window or the window is flat.
pub fn z_score(series: &[f64], window: usize) -> f64 {
    if window == 0 || series.len() < window {
        return 0.0;
    }

    let recent = &series[series.len() - window..];
    let mean = recent.iter().sum::<f64>() / window as f64;
    let variance = recent.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return 0.0;
    }

    let current = series[series.len() - 1];
    (current - mean) / std_dev
}

/// Percentage change between the last value and the value `lookback`
/// steps earlier.
pub fn slope_percent(series: &[f64], lookback: usize) -> f64 {
    if lookback == 0 || series.len() < lookback + 1 {
        return 0.0;
    }

    let a = series[series.len() - 1];
    let b = series[series.len() - 1 - lookback];
    if b == 0.0 {
        return 0.0;
    }

    ((a - b) / b) * 100.0
}
