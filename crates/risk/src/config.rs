use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// User-configurable risk parameters (`[risk]` section).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Blended risk above this forces a SELL (e.g. 0.7).
    pub override_threshold: f64,
    /// Instruments scoring below this get the larger allocation.
    pub low_risk_cutoff: f64,
    /// Max fraction of equity for a low-risk instrument (e.g. 0.2 = 20%).
    pub low_risk_fraction: f64,
    /// Max fraction of equity for everything else.
    pub high_risk_fraction: f64,
    /// Unrealized gain that arms the trailing stop (e.g. 0.10 = 10%).
    pub trailing_trigger_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            override_threshold: 0.7,
            low_risk_cutoff: 0.3,
            low_risk_fraction: 0.2,
            high_risk_fraction: 0.1,
            trailing_trigger_pct: 0.10,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.override_threshold) || !unit.contains(&self.low_risk_cutoff) {
            return Err(Error::Config(
                "override_threshold and low_risk_cutoff must be in [0, 1]".into(),
            ));
        }
        // Both tiers stay strictly below 1 so the fractional cap is always
        // at least as tight as the whole-equity cap.
        for fraction in [self.low_risk_fraction, self.high_risk_fraction] {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(Error::Config(format!(
                    "position fraction must be in (0, 1), got {fraction}"
                )));
            }
        }
        if !(self.trailing_trigger_pct >= 0.0) {
            return Err(Error::Config("trailing_trigger_pct must be >= 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RiskConfig::default().validate().is_ok());
    }

    #[test]
    fn full_allocation_rejected() {
        let cfg = RiskConfig {
            low_risk_fraction: 1.0,
            ..RiskConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: RiskConfig = toml::from_str("override_threshold = 0.8").unwrap();
        assert_eq!(cfg.override_threshold, 0.8);
        assert_eq!(cfg.low_risk_fraction, 0.2);
    }
}
