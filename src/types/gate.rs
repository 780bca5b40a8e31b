use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete market regime derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateColor {
    Green,
    Yellow,
    Red,
}

impl GateColor {
    /// Lower bound (inclusive) of the GREEN band.
    pub const GREEN_MIN: u8 = 72;
    /// Lower bound (inclusive) of the YELLOW band.
    pub const YELLOW_MIN: u8 = 48;

    /// Map a composite score (0-100) to its gate band.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= Self::GREEN_MIN => GateColor::Green,
            s if s >= Self::YELLOW_MIN => GateColor::Yellow,
            _ => GateColor::Red,
        }
    }

    /// One-line reading of the regime.
    pub fn summary(&self) -> &'static str {
        match self {
            GateColor::Green => "Risk-on: trend, participation and breadth support new positions",
            GateColor::Yellow => "Caution: mixed conditions, reduce position sizing",
            GateColor::Red => "Risk-off: defensive positioning recommended",
        }
    }
}

impl fmt::Display for GateColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateColor::Green => write!(f, "GREEN"),
            GateColor::Yellow => write!(f, "YELLOW"),
            GateColor::Red => write!(f, "RED"),
        }
    }
}

/// Per-category point allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateComponents {
    /// 0-35
    pub trend: u8,
    /// 0-18
    pub volatility: u8,
    /// 0-18
    pub participation: u8,
    /// 0-18
    pub breadth: u8,
    /// 0-11
    pub leverage: u8,
}

impl GateComponents {
    pub const TREND_MAX: u8 = 35;
    pub const VOLATILITY_MAX: u8 = 18;
    pub const PARTICIPATION_MAX: u8 = 18;
    pub const BREADTH_MAX: u8 = 18;
    pub const LEVERAGE_MAX: u8 = 11;

    /// Sum of all categories.
    pub fn total(&self) -> u32 {
        u32::from(self.trend)
            + u32::from(self.volatility)
            + u32::from(self.participation)
            + u32::from(self.breadth)
            + u32::from(self.leverage)
    }
}

/// Cosmetic direction label attached to each displayed indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorSignal {
    Bullish,
    Bearish,
    Neutral,
}

/// Display value: either a preformatted string or a raw number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl From<i64> for IndicatorValue {
    fn from(v: i64) -> Self {
        IndicatorValue::Integer(v)
    }
}

impl From<f64> for IndicatorValue {
    fn from(v: f64) -> Self {
        IndicatorValue::Number(v)
    }
}

impl From<String> for IndicatorValue {
    fn from(v: String) -> Self {
        IndicatorValue::Text(v)
    }
}

/// One row of the indicator table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDisplay {
    pub name: String,
    pub value: IndicatorValue,
    pub signal: IndicatorSignal,
}

/// Result of a market gate computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    /// Composite score, 0-100.
    pub score: u8,
    pub gate_color: GateColor,
    pub summary: String,
    pub components: GateComponents,
    pub indicators: Vec<IndicatorDisplay>,
    pub timestamp: DateTime<Utc>,
}

impl GateResult {
    /// Find an indicator row by name.
    pub fn indicator(&self, name: &str) -> Option<&IndicatorDisplay> {
        self.indicators.iter().find(|i| i.name == name)
    }
}
