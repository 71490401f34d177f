use tracing::warn;

use common::RiskScore;

/// Result of blending model and news risk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateOutcome {
    pub total_risk: RiskScore,
    /// True when the decision must be forced to SELL without consulting the model.
    pub overridden: bool,
}

/// Pre-empts model inference when instrument or news risk is too high.
#[derive(Debug, Clone, Copy)]
pub struct RiskGate {
    threshold: f64,
}

impl Default for RiskGate {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

impl RiskGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `total = max(model, news)`; override when strictly above the threshold.
    pub fn gate(&self, model_risk: RiskScore, news_risk: RiskScore) -> GateOutcome {
        let total_risk = model_risk.max(news_risk);
        let overridden = total_risk.value() > self.threshold;
        if overridden {
            warn!(
                model = model_risk.value(),
                news = news_risk.value(),
                threshold = self.threshold,
                "Risk gate override, forcing SELL"
            );
        }
        GateOutcome { total_risk, overridden }
    }
}
