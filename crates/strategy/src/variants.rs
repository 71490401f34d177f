use std::sync::Arc;

use tracing::{debug, info};

use common::{Decision, PositionState, Result, Series, Signal};

use crate::advisor::PriceAdvisor;
use crate::config::{StrategyConfig, Variant};
use crate::router::{SignalRouter, Thresholds};
use crate::Strategy;

/// Build the configured strategy variant.
pub fn build_strategy(cfg: &StrategyConfig) -> Result<Arc<dyn Strategy>> {
    let thresholds = cfg.thresholds();
    // Re-validate: thresholds may come straight from the config file.
    let thresholds = Thresholds::new(thresholds.buy, thresholds.sell)?;
    let advisor = PriceAdvisor::new(cfg.advisor)?;
    let name = cfg.display_name();

    let strategy: Arc<dyn Strategy> = match cfg.variant {
        Variant::Base => Arc::new(BaseStrategy::new(name, thresholds, advisor)),
        Variant::Enhanced => Arc::new(EnhancedStrategy::new(name, thresholds, advisor)),
    };
    info!(
        name = %strategy.name(),
        buy = thresholds.buy,
        sell = thresholds.sell,
        "Strategy configured"
    );
    Ok(strategy)
}

// ─── Concrete strategy types ──────────────────────────────────────────────────

/// Routes every probability straight to a signal, regardless of position.
pub struct BaseStrategy {
    name: String,
    router: SignalRouter,
    advisor: PriceAdvisor,
}

impl BaseStrategy {
    pub fn new(name: impl Into<String>, thresholds: Thresholds, advisor: PriceAdvisor) -> Self {
        Self {
            name: name.into(),
            router: SignalRouter::new(thresholds),
            advisor,
        }
    }
}

impl Strategy for BaseStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn thresholds(&self) -> Thresholds {
        self.router.thresholds()
    }

    fn advisor(&self) -> &PriceAdvisor {
        &self.advisor
    }

    fn evaluate(
        &self,
        series: &Series,
        atr: f64,
        probability: f64,
        _position: PositionState,
    ) -> Result<Decision> {
        let signal = self.router.route(probability);
        Ok(Decision {
            signal,
            confidence: probability,
            advice: self.advisor.advise_with_atr(series, signal, atr)?,
            risk_override: false,
        })
    }
}

/// Opens only from FLAT and closes only from LONG; any other routed signal
/// degrades to HOLD.
pub struct EnhancedStrategy {
    name: String,
    router: SignalRouter,
    advisor: PriceAdvisor,
}

impl EnhancedStrategy {
    pub fn new(name: impl Into<String>, thresholds: Thresholds, advisor: PriceAdvisor) -> Self {
        Self {
            name: name.into(),
            router: SignalRouter::new(thresholds),
            advisor,
        }
    }
}

impl Strategy for EnhancedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn thresholds(&self) -> Thresholds {
        self.router.thresholds()
    }

    fn advisor(&self) -> &PriceAdvisor {
        &self.advisor
    }

    fn evaluate(
        &self,
        series: &Series,
        atr: f64,
        probability: f64,
        position: PositionState,
    ) -> Result<Decision> {
        let routed = self.router.route(probability);
        let signal = match (routed, position) {
            (Signal::Buy, PositionState::Flat) => Signal::Buy,
            (Signal::Sell, PositionState::Long) => Signal::Sell,
            (Signal::Hold, _) => Signal::Hold,
            (other, state) => {
                debug!(routed = %other, position = %state, "Signal not actionable in current position");
                Signal::Hold
            }
        };
        Ok(Decision {
            signal,
            confidence: probability,
            advice: self.advisor.advise_with_atr(series, signal, atr)?,
            risk_override: false,
        })
    }
}
