use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// One OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// High bounds every other price, low is bounded by every other price,
    /// and volume is non-negative.
    pub fn is_consistent(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) || !(self.volume >= 0.0) {
            return false;
        }
        self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
    }
}

/// Bars in strictly ascending time order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Validate and wrap a bar vector.
    ///
    /// Rejects empty input, out-of-order or duplicate timestamps, and bars
    /// that break the OHLC invariant.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(Error::InsufficientData { needed: 1, available: 0 });
        }
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_consistent() {
                return Err(Error::InvalidData(format!(
                    "bar at {} violates OHLC invariant",
                    bar.timestamp
                )));
            }
            if i > 0 && bars[i - 1].timestamp >= bar.timestamp {
                return Err(Error::InvalidData(format!(
                    "bars not strictly ascending at {}",
                    bar.timestamp
                )));
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The trailing `n` bars, or the whole series if shorter.
    pub fn tail(&self, n: usize) -> &[Bar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }
}

/// Trading decision for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Lenient parse used at collaborator boundaries: anything unrecognised
    /// becomes `Hold` so it never produces price advice.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_else(|e: Error| {
            warn!(error = %e, "Treating unrecognised signal as HOLD");
            Signal::Hold
        })
    }
}

impl FromStr for Signal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Signal::Buy),
            "SELL" => Ok(Signal::Sell),
            "HOLD" => Ok(Signal::Hold),
            _ => Err(Error::InvalidSignal(s.to_string())),
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Concrete order parameters for a BUY or SELL. HOLD carries no advice, so
/// callers hold an `Option<PriceAdvice>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceAdvice {
    pub limit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Risk estimate in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RiskScore(f64);

impl RiskScore {
    pub const ZERO: RiskScore = RiskScore(0.0);

    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidData(format!("risk score {value} outside [0, 1]")))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Conservative blend: the higher estimate dominates.
    pub fn max(self, other: RiskScore) -> RiskScore {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl TryFrom<f64> for RiskScore {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        RiskScore::new(value)
    }
}

impl From<RiskScore> for f64 {
    fn from(score: RiskScore) -> f64 {
        score.0
    }
}

/// Whether an instrument currently holds a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl std::fmt::Display for PositionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionState::Flat => write!(f, "FLAT"),
            PositionState::Long => write!(f, "LONG"),
        }
    }
}

/// Position held in a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub instrument: String,
    pub state: PositionState,
    pub entry_price: f64,
    /// Whole units; zero while flat.
    pub size: u64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Position {
    pub fn flat(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            state: PositionState::Flat,
            entry_price: 0.0,
            size: 0,
            stop_loss: 0.0,
            take_profit: 0.0,
        }
    }

    pub fn is_long(&self) -> bool {
        self.state == PositionState::Long
    }
}

/// Historical performance produced by an external backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestStats {
    /// Fraction of winning trades, `[0, 1]`.
    pub win_rate: f64,
    pub sharpe: f64,
    /// Peak-to-trough change as a fraction; backtesters report it as <= 0.
    pub max_drawdown: f64,
}

/// Classifier input for the latest bar, in the order the model expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub rsi: f64,
    pub ma20: f64,
    pub ma5: f64,
    pub volatility: f64,
    pub volume: f64,
}

impl FeatureVector {
    pub fn as_array(&self) -> [f64; 5] {
        [self.rsi, self.ma20, self.ma5, self.volatility, self.volume]
    }
}

/// Outcome of evaluating one instrument, before backtest data is merged in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub signal: Signal,
    /// Raw classifier probability, or 0.0 when the risk gate forced the exit.
    pub confidence: f64,
    pub advice: Option<PriceAdvice>,
    pub risk_override: bool,
}

/// One line of the batch report. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub ticker: String,
    pub signal: Signal,
    pub confidence: f64,
    pub advice: Option<PriceAdvice>,
    pub risk_score: RiskScore,
    pub stats: BacktestStats,
}
