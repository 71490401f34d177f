use serde::{Deserialize, Serialize};

use common::{Error, Result, Signal};

/// Probability cut-offs. Both bounds are exclusive: a probability equal to
/// either threshold routes to HOLD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub buy: f64,
    pub sell: f64,
}

impl Thresholds {
    /// Batch report path.
    pub const REPORT: Thresholds = Thresholds { buy: 0.6, sell: 0.4 };
    /// Position-aware entry/exit path.
    pub const ENTRY_EXIT: Thresholds = Thresholds { buy: 0.65, sell: 0.35 };

    pub fn new(buy: f64, sell: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&buy) || !(0.0..=1.0).contains(&sell) || sell >= buy {
            return Err(Error::Config(format!(
                "thresholds must satisfy 0 <= sell < buy <= 1, got sell={sell} buy={buy}"
            )));
        }
        Ok(Self { buy, sell })
    }
}

/// Maps a classifier probability onto BUY / SELL / HOLD.
/// The band between the thresholds is a dead zone against churn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRouter {
    thresholds: Thresholds,
}

impl Default for SignalRouter {
    fn default() -> Self {
        Self { thresholds: Thresholds::REPORT }
    }
}

impl SignalRouter {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn route(&self, probability: f64) -> Signal {
        if probability > self.thresholds.buy {
            Signal::Buy
        } else if probability < self.thresholds.sell {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_boundaries_are_open() {
        let router = SignalRouter::default();
        assert_eq!(router.route(0.6), Signal::Hold);
        assert_eq!(router.route(0.4), Signal::Hold);
        assert_eq!(router.route(0.5), Signal::Hold);
        assert_eq!(router.route(0.61), Signal::Buy);
        assert_eq!(router.route(0.39), Signal::Sell);
    }

    #[test]
    fn entry_exit_pair_is_tighter() {
        let router = SignalRouter::new(Thresholds::ENTRY_EXIT);
        assert_eq!(router.route(0.62), Signal::Hold);
        assert_eq!(router.route(0.38), Signal::Hold);
        assert_eq!(router.route(0.66), Signal::Buy);
        assert_eq!(router.route(0.34), Signal::Sell);
    }

    #[test]
    fn threshold_validation() {
        assert!(Thresholds::new(0.6, 0.4).is_ok());
        assert!(Thresholds::new(0.4, 0.6).is_err());
        assert!(Thresholds::new(0.5, 0.5).is_err());
        assert!(Thresholds::new(1.2, 0.4).is_err());
    }
}
