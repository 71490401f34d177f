use tracing::{debug, info};

use common::{Decision, Error, Position, PositionState, Result, RiskScore, Signal};

use crate::config::RiskConfig;

/// What `PositionManager::apply` did with a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened { size: u64 },
    Closed,
    Unchanged,
}

/// Sizes entries and ratchets the trailing stop for one instrument.
///
/// State machine:
/// - FLAT --BUY--> LONG
/// - LONG --SELL--> FLAT (also via `close()` when an external executor sees
///   the stop or target touched)
/// - LONG --trailing trigger--> LONG with a higher stop
///
/// BUY while LONG and SELL/HOLD while FLAT are no-ops.
#[derive(Debug, Clone)]
pub struct PositionManager {
    config: RiskConfig,
    position: Position,
}

impl PositionManager {
    pub fn new(instrument: impl Into<String>, config: RiskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            position: Position::flat(instrument),
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn state(&self) -> PositionState {
        self.position.state
    }

    /// Allocation cap for an instrument with this risk score.
    pub fn max_fraction(&self, risk_score: RiskScore) -> f64 {
        if risk_score.value() < self.config.low_risk_cutoff {
            self.config.low_risk_fraction
        } else {
            self.config.high_risk_fraction
        }
    }

    /// Whole units to buy at `limit_price`.
    ///
    /// `floor(min(fraction × equity / price, equity / price))`. The second
    /// term never binds while the fraction is below 1, which `RiskConfig`
    /// enforces.
    pub fn size_entry(&self, equity: f64, risk_score: RiskScore, limit_price: f64) -> Result<u64> {
        if !(limit_price > 0.0) || !limit_price.is_finite() {
            return Err(Error::InvalidData(format!(
                "limit price must be positive, got {limit_price}"
            )));
        }
        if !(equity >= 0.0) || !equity.is_finite() {
            return Err(Error::InvalidData(format!(
                "equity must be non-negative, got {equity}"
            )));
        }
        let fraction = self.max_fraction(risk_score);
        let capped = fraction * equity / limit_price;
        let whole = equity / limit_price;
        Ok(capped.min(whole).floor() as u64)
    }

    /// Apply a routed decision to the position.
    pub fn apply(
        &mut self,
        decision: &Decision,
        equity: f64,
        risk_score: RiskScore,
    ) -> Result<Transition> {
        match (decision.signal, self.position.state) {
            (Signal::Buy, PositionState::Flat) => {
                let advice = decision.advice.ok_or_else(|| {
                    Error::InvalidData("BUY decision without price advice".into())
                })?;
                let size = self.size_entry(equity, risk_score, advice.limit_price)?;
                if size == 0 {
                    info!(
                        instrument = %self.position.instrument,
                        equity,
                        limit = advice.limit_price,
                        "Entry sized to zero units, staying flat"
                    );
                    return Ok(Transition::Unchanged);
                }
                self.position = Position {
                    instrument: self.position.instrument.clone(),
                    state: PositionState::Long,
                    entry_price: advice.limit_price,
                    size,
                    stop_loss: advice.stop_loss,
                    take_profit: advice.take_profit,
                };
                info!(
                    instrument = %self.position.instrument,
                    size,
                    entry = advice.limit_price,
                    stop = advice.stop_loss,
                    target = advice.take_profit,
                    "Position opened"
                );
                Ok(Transition::Opened { size })
            }
            (Signal::Sell, PositionState::Long) => {
                self.close();
                Ok(Transition::Closed)
            }
            (signal, state) => {
                debug!(
                    instrument = %self.position.instrument,
                    signal = %signal,
                    position = %state,
                    "No position transition"
                );
                Ok(Transition::Unchanged)
            }
        }
    }

    /// Ratchet the stop toward `current_price − atr` once the position is up
    /// by the trailing trigger. `atr` must be recomputed by the caller from
    /// the current series.
    pub fn update_trailing_stop(&mut self, current_price: f64, atr: f64) -> Result<&Position> {
        if !(atr >= 0.0) || !current_price.is_finite() {
            return Err(Error::InvalidData(format!(
                "trailing stop needs finite price and non-negative ATR, got price={current_price} atr={atr}"
            )));
        }
        let updated = trailing_stop(
            &self.position,
            current_price,
            atr,
            self.config.trailing_trigger_pct,
        );
        if updated.stop_loss > self.position.stop_loss {
            info!(
                instrument = %self.position.instrument,
                previous = self.position.stop_loss,
                stop = updated.stop_loss,
                price = current_price,
                "Trailing stop raised"
            );
        }
        self.position = updated;
        Ok(&self.position)
    }

    /// Flatten the position, returning what was held.
    pub fn close(&mut self) -> Option<Position> {
        if !self.position.is_long() {
            return None;
        }
        let flat = Position::flat(self.position.instrument.clone());
        let closed = std::mem::replace(&mut self.position, flat);
        info!(
            instrument = %closed.instrument,
            size = closed.size,
            entry = closed.entry_price,
            "Position closed"
        );
        Some(closed)
    }
}

/// Pure trailing-stop step.
///
/// Applies only to LONG positions trading above `entry × (1 + trigger_pct)`.
/// The stop never decreases.
pub fn trailing_stop(position: &Position, current_price: f64, atr: f64, trigger_pct: f64) -> Position {
    let mut next = position.clone();
    if position.is_long() && current_price > position.entry_price * (1.0 + trigger_pct) {
        next.stop_loss = position.stop_loss.max(current_price - atr);
    }
    next
}
