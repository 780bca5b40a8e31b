//! Composite scoring: inputs → indicators → components → gate result.

use crate::error::GateError;
use crate::services::market_gate::scorers::{
    score_breadth, score_leverage, score_participation, score_trend, score_volatility,
};
use crate::services::market_gate::transforms::{
    atr_percent, ema, slope_percent, z_score, ATR_PERIOD, SLOPE_LOOKBACK, Z_SCORE_WINDOW,
};
use crate::sources::FetchError;
use crate::types::{
    GateColor, GateComponents, GateResult, IndicatorDisplay, IndicatorSignal, IndicatorValue,
    MarketHistory,
};
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use tracing::warn;

/// Minimum number of closes needed to score.
pub const MIN_PRICE_POINTS: usize = 200;

pub const EMA_FAST_PERIOD: usize = 50;
pub const EMA_SLOW_PERIOD: usize = 200;

/// Substituted when the fear & greed fetch fails.
pub const DEFAULT_FEAR_GREED: u8 = 50;
/// Substituted when the funding rate fetch fails.
pub const DEFAULT_FUNDING_RATE: f64 = 0.0001;
/// Substituted when the breadth fetch fails.
pub const DEFAULT_ALT_BREADTH: f64 = 0.5;

/// Everything the scoring function consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct GateInputs {
    pub prices: Vec<f64>,
    pub volumes: Vec<f64>,
    pub alt_breadth_ratio: f64,
    pub fear_greed_index: u8,
    pub funding_rate: f64,
}

impl GateInputs {
    /// Combine the primary history with secondary fetch outcomes.
    ///
    /// Failed secondary indicators are replaced by their defaults here and
    /// nowhere else.
    pub fn resolve(
        history: &MarketHistory,
        alt_breadth: Result<f64, FetchError>,
        fear_greed: Result<u8, FetchError>,
        funding_rate: Result<f64, FetchError>,
    ) -> Self {
        Self {
            prices: history.closes(),
            volumes: history.volume_values(),
            alt_breadth_ratio: or_default("altcoin breadth", alt_breadth, DEFAULT_ALT_BREADTH)
                .clamp(0.0, 1.0),
            fear_greed_index: or_default("fear & greed", fear_greed, DEFAULT_FEAR_GREED).min(100),
            funding_rate: or_default("funding rate", funding_rate, DEFAULT_FUNDING_RATE),
        }
    }
}

fn or_default<T: Debug>(name: &str, result: Result<T, FetchError>, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{} unavailable ({}), using default {:?}", name, e, default);
            default
        }
    }
}

/// Derived indicator values for one scoring run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateIndicators {
    pub price: f64,
    pub ema50: f64,
    pub ema200: f64,
    /// % change of EMA200 over the slope lookback.
    pub ema200_slope: f64,
    pub atr_percent: f64,
    pub volume_z_score: f64,
    pub alt_breadth_ratio: f64,
    pub fear_greed_index: u8,
    pub funding_rate: f64,
}

impl GateIndicators {
    /// Run the technical transforms over the inputs.
    pub fn from_inputs(inputs: &GateInputs) -> Result<Self, GateError> {
        let prices = &inputs.prices;
        if prices.len() < MIN_PRICE_POINTS {
            return Err(GateError::InsufficientData {
                required: MIN_PRICE_POINTS,
                provided: prices.len(),
            });
        }

        let ema50_series = ema(prices, EMA_FAST_PERIOD);
        let ema200_series = ema(prices, EMA_SLOW_PERIOD);
        let last = prices.len() - 1;

        Ok(Self {
            price: prices[last],
            ema50: ema50_series[last],
            ema200: ema200_series[last],
            ema200_slope: slope_percent(&ema200_series, SLOPE_LOOKBACK),
            atr_percent: atr_percent(prices, ATR_PERIOD),
            volume_z_score: z_score(&inputs.volumes, Z_SCORE_WINDOW),
            alt_breadth_ratio: inputs.alt_breadth_ratio,
            fear_greed_index: inputs.fear_greed_index,
            funding_rate: inputs.funding_rate,
        })
    }

    /// Apply the five category rubrics.
    pub fn components(&self) -> GateComponents {
        GateComponents {
            trend: score_trend(self.price, self.ema50, self.ema200, self.ema200_slope),
            volatility: score_volatility(self.atr_percent),
            participation: score_participation(self.volume_z_score),
            breadth: score_breadth(self.alt_breadth_ratio),
            leverage: score_leverage(self.funding_rate),
        }
    }
}

/// Score a full set of inputs.
///
/// Fails only when the price history is too short; no partial score is
/// ever produced.
pub fn compute_gate(inputs: &GateInputs, now: DateTime<Utc>) -> Result<GateResult, GateError> {
    let indicators = GateIndicators::from_inputs(inputs)?;
    Ok(evaluate(&indicators, now))
}

/// Score already-derived indicators.
pub fn evaluate(indicators: &GateIndicators, now: DateTime<Utc>) -> GateResult {
    let components = indicators.components();
    let score = components.total().min(100) as u8;
    let gate_color = GateColor::from_score(score);

    GateResult {
        score,
        gate_color,
        summary: summarize(gate_color, score, &components),
        components,
        indicators: indicator_table(indicators),
        timestamp: now,
    }
}

fn summarize(color: GateColor, score: u8, components: &GateComponents) -> String {
    let shares = [
        ("trend", components.trend, GateComponents::TREND_MAX),
        ("volatility", components.volatility, GateComponents::VOLATILITY_MAX),
        ("participation", components.participation, GateComponents::PARTICIPATION_MAX),
        ("breadth", components.breadth, GateComponents::BREADTH_MAX),
        ("leverage", components.leverage, GateComponents::LEVERAGE_MAX),
    ];

    let weakest = shares
        .iter()
        .min_by(|a, b| {
            let ra = f64::from(a.1) / f64::from(a.2);
            let rb = f64::from(b.1) / f64::from(b.2);
            ra.total_cmp(&rb)
        })
        .map(|s| s.0)
        .unwrap_or("trend");

    format!(
        "{} ({}/100, weakest factor: {})",
        color.summary(),
        score,
        weakest
    )
}

/// Build the nine display rows. Signals here are cosmetic and use their
/// own thresholds, independent of the scoring rubric.
pub fn indicator_table(ind: &GateIndicators) -> Vec<IndicatorDisplay> {
    vec![
        row("Price", format_usd(ind.price), compare(ind.price, ind.ema50)),
        row("EMA50", format_usd(ind.ema50), compare(ind.ema50, ind.ema200)),
        row("EMA200", format_usd(ind.ema200), compare(ind.price, ind.ema200)),
        row(
            "EMA200 Slope",
            format!("{:+.2}%", ind.ema200_slope),
            band(ind.ema200_slope, 0.5, -0.5),
        ),
        row(
            "ATR%",
            format!("{:.2}%", ind.atr_percent),
            if ind.atr_percent <= 2.5 {
                IndicatorSignal::Bullish
            } else if ind.atr_percent > 5.0 {
                IndicatorSignal::Bearish
            } else {
                IndicatorSignal::Neutral
            },
        ),
        row(
            "Volume Z-Score",
            round2(ind.volume_z_score),
            band(ind.volume_z_score, 1.0, -1.0),
        ),
        row(
            "Fear & Greed Index",
            i64::from(ind.fear_greed_index),
            band(f64::from(ind.fear_greed_index), 60.0, 40.0),
        ),
        row(
            "Altcoin Breadth",
            format!("{:.1}%", ind.alt_breadth_ratio * 100.0),
            band(ind.alt_breadth_ratio, 0.55, 0.40),
        ),
        row(
            "Funding Rate",
            format!("{:.4}%", ind.funding_rate * 100.0),
            if ind.funding_rate > 0.001 {
                IndicatorSignal::Bearish
            } else if ind.funding_rate < -0.0005 {
                IndicatorSignal::Bullish
            } else {
                IndicatorSignal::Neutral
            },
        ),
    ]
}

fn row(name: &str, value: impl Into<IndicatorValue>, signal: IndicatorSignal) -> IndicatorDisplay {
    IndicatorDisplay {
        name: name.to_string(),
        value: value.into(),
        signal,
    }
}

fn compare(a: f64, b: f64) -> IndicatorSignal {
    if a > b {
        IndicatorSignal::Bullish
    } else if a < b {
        IndicatorSignal::Bearish
    } else {
        IndicatorSignal::Neutral
    }
}

/// Bullish at or above `high`, bearish at or below `low`.
fn band(value: f64, high: f64, low: f64) -> IndicatorSignal {
    if value >= high {
        IndicatorSignal::Bullish
    } else if value <= low {
        IndicatorSignal::Bearish
    } else {
        IndicatorSignal::Neutral
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `64321.5` → `"$64,321.50"`
fn format_usd(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeriesPoint;

    fn indicators() -> GateIndicators {
        GateIndicators {
            price: 100.0,
            ema50: 95.0,
            ema200: 90.0,
            ema200_slope: 0.4,
            atr_percent: 3.0,
            volume_z_score: 0.5,
            alt_breadth_ratio: 0.55,
            fear_greed_index: 62,
            funding_rate: 0.0001,
        }
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(64321.5), "$64,321.50");
        assert_eq!(format_usd(999.999), "$1,000.00");
        assert_eq!(format_usd(12.0), "$12.00");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(-1500.0), "-$1,500.00");
    }

    #[test]
    fn test_indicator_table_has_nine_rows() {
        let table = indicator_table(&indicators());
        let names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Price",
                "EMA50",
                "EMA200",
                "EMA200 Slope",
                "ATR%",
                "Volume Z-Score",
                "Fear & Greed Index",
                "Altcoin Breadth",
                "Funding Rate",
            ]
        );
    }

    #[test]
    fn test_indicator_signals() {
        let table = indicator_table(&indicators());
        let signal = |name: &str| table.iter().find(|r| r.name == name).unwrap().signal;

        assert_eq!(signal("Price"), IndicatorSignal::Bullish);
        assert_eq!(signal("EMA50"), IndicatorSignal::Bullish);
        assert_eq!(signal("EMA200 Slope"), IndicatorSignal::Neutral);
        assert_eq!(signal("ATR%"), IndicatorSignal::Neutral);
        assert_eq!(signal("Fear & Greed Index"), IndicatorSignal::Bullish);
        assert_eq!(signal("Altcoin Breadth"), IndicatorSignal::Bullish);
        assert_eq!(signal("Funding Rate"), IndicatorSignal::Neutral);
    }

    #[test]
    fn test_indicator_values() {
        let table = indicator_table(&indicators());
        assert_eq!(table[0].value, IndicatorValue::Text("$100.00".into()));
        assert_eq!(table[3].value, IndicatorValue::Text("+0.40%".into()));
        assert_eq!(table[5].value, IndicatorValue::Number(0.5));
        assert_eq!(table[6].value, IndicatorValue::Integer(62));
        assert_eq!(table[7].value, IndicatorValue::Text("55.0%".into()));
        assert_eq!(table[8].value, IndicatorValue::Text("0.0100%".into()));
    }

    #[test]
    fn test_resolve_substitutes_defaults() {
        let history = MarketHistory {
            prices: vec![SeriesPoint { time: 0, value: 1.0 }],
            volumes: vec![],
        };
        let inputs = GateInputs::resolve(
            &history,
            Err(FetchError::Timeout("breadth")),
            Err(FetchError::Invalid("down".into())),
            Err(FetchError::Status {
                upstream: "Binance",
                status: 451,
            }),
        );
        assert_eq!(inputs.alt_breadth_ratio, DEFAULT_ALT_BREADTH);
        assert_eq!(inputs.fear_greed_index, DEFAULT_FEAR_GREED);
        assert_eq!(inputs.funding_rate, DEFAULT_FUNDING_RATE);
        assert_eq!(inputs.prices, vec![1.0]);
    }

    #[test]
    fn test_resolve_keeps_successful_values() {
        let inputs = GateInputs::resolve(&MarketHistory::default(), Ok(0.7), Ok(21), Ok(-0.0002));
        assert_eq!(inputs.alt_breadth_ratio, 0.7);
        assert_eq!(inputs.fear_greed_index, 21);
        assert_eq!(inputs.funding_rate, -0.0002);
    }

    #[test]
    fn test_summary_names_weakest_factor() {
        let components = GateComponents {
            trend: 35,
            volatility: 18,
            participation: 18,
            breadth: 2,
            leverage: 9,
        };
        let summary = summarize(GateColor::Green, 82, &components);
        assert!(summary.contains("82/100"));
        assert!(summary.contains("weakest factor: breadth"));
    }
}
