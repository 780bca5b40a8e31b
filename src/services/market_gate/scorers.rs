//! Category rubrics.
//!
//! Breakpoints and point values are fixed; every scorer returns one of a
//! small set of tier values, never a continuous score.

/// Trend: EMA stack (0/12/22) plus EMA200 slope (0/3/8/13). Max 35.
pub fn score_trend(price: f64, ema50: f64, ema200: f64, ema200_slope: f64) -> u8 {
    let stack = if price > ema50 && ema50 > ema200 {
        22
    } else if price > ema50 {
        12
    } else {
        0
    };

    let slope = if ema200_slope > 1.0 {
        13
    } else if ema200_slope > 0.0 {
        8
    } else if ema200_slope > -1.0 {
        3
    } else {
        0
    };

    stack + slope
}

/// Volatility: calmer markets score higher. Max 18.
pub fn score_volatility(atr_percent: f64) -> u8 {
    if atr_percent <= 2.0 {
        18
    } else if atr_percent <= 3.5 {
        14
    } else if atr_percent <= 5.0 {
        8
    } else {
        2
    }
}

/// Participation: volume z-score. Max 18.
pub fn score_participation(volume_z: f64) -> u8 {
    if volume_z >= 1.0 {
        18
    } else if volume_z >= 0.3 {
        12
    } else if volume_z >= -0.3 {
        6
    } else {
        2
    }
}

/// Breadth: share of altcoins advancing. Max 18.
pub fn score_breadth(alt_ratio: f64) -> u8 {
    if alt_ratio >= 0.65 {
        18
    } else if alt_ratio >= 0.50 {
        12
    } else if alt_ratio >= 0.35 {
        6
    } else {
        2
    }
}

/// Leverage: perpetual funding rate. Max 11 by rubric, 9 in practice.
pub fn score_leverage(funding_rate: f64) -> u8 {
    if funding_rate > -0.0003 && funding_rate < 0.0005 {
        9
    } else if funding_rate > 0.001 {
        2
    } else if funding_rate < -0.0005 {
        4
    } else {
        6
    }
}
