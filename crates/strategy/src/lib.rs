pub mod advisor;
pub mod config;
pub mod features;
pub mod indicators;
pub mod router;
pub mod variants;

#[cfg(test)]
mod testing;

pub use advisor::{AdvisorConfig, PriceAdvisor};
pub use config::{StrategyConfig, Variant};
pub use features::feature_vector;
pub use indicators::VolatilityEstimator;
pub use router::{SignalRouter, Thresholds};
pub use variants::{build_strategy, BaseStrategy, EnhancedStrategy};

use common::{Decision, PositionState, Result, Series, Signal};

/// A signal-generation variant. Variants share the `PriceAdvisor`; they
/// differ only in how a probability becomes a signal.
pub trait Strategy: Send + Sync {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    fn thresholds(&self) -> Thresholds;

    fn advisor(&self) -> &PriceAdvisor;

    /// ATR for `series`, recomputed on every call.
    fn compute_volatility(&self, series: &Series) -> Result<f64> {
        self.advisor().volatility(series)
    }

    /// Turn a classifier probability into a decision with price advice.
    fn evaluate(
        &self,
        series: &Series,
        atr: f64,
        probability: f64,
        position: PositionState,
    ) -> Result<Decision>;

    /// Forced exit when the risk gate overrides the model. Confidence is
    /// reported as 0.0 to mark the decision as risk-driven.
    fn risk_exit(&self, series: &Series, atr: f64) -> Result<Decision> {
        Ok(Decision {
            signal: Signal::Sell,
            confidence: 0.0,
            advice: self.advisor().advise_with_atr(series, Signal::Sell, atr)?,
            risk_override: true,
        })
    }
}
