use serde::{Deserialize, Serialize};

use common::{Error, PriceAdvice, Result, Series, Signal};

use crate::indicators::{VolatilityEstimator, DEFAULT_ATR_WINDOW};

/// Pricing parameters. Defaults reproduce the production policy:
/// bid 0.5% under / offer 0.5% over the last close, 2×ATR stop, 3×ATR target,
/// 1×ATR stop after a confirmed breakout of the 5-bar resistance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub atr_window: usize,
    /// Fraction below the last close for BUY limits (0.005 = 0.5%).
    pub buy_discount: f64,
    /// Fraction above the last close for SELL limits.
    pub sell_premium: f64,
    pub stop_atr_multiple: f64,
    pub target_atr_multiple: f64,
    /// Stop distance once the last close is at or above resistance.
    pub breakout_stop_atr_multiple: f64,
    pub resistance_window: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            atr_window: DEFAULT_ATR_WINDOW,
            buy_discount: 0.005,
            sell_premium: 0.005,
            stop_atr_multiple: 2.0,
            target_atr_multiple: 3.0,
            breakout_stop_atr_multiple: 1.0,
            resistance_window: 5,
        }
    }
}

impl AdvisorConfig {
    fn validate(&self) -> Result<()> {
        if self.resistance_window == 0 {
            return Err(Error::Config("resistance_window must be >= 1".into()));
        }
        if !(0.0..1.0).contains(&self.buy_discount) || !(self.sell_premium >= 0.0) {
            return Err(Error::Config(
                "buy_discount must be in [0, 1) and sell_premium >= 0".into(),
            ));
        }
        let multiples = [
            self.stop_atr_multiple,
            self.target_atr_multiple,
            self.breakout_stop_atr_multiple,
        ];
        if multiples.iter().any(|m| !(*m > 0.0) || !m.is_finite()) {
            return Err(Error::Config("ATR multiples must be positive".into()));
        }
        Ok(())
    }
}

/// Turns a signal plus recent history into limit / stop / target prices.
#[derive(Debug, Clone, Copy)]
pub struct PriceAdvisor {
    config: AdvisorConfig,
    volatility: VolatilityEstimator,
}

impl Default for PriceAdvisor {
    fn default() -> Self {
        Self {
            config: AdvisorConfig::default(),
            volatility: VolatilityEstimator::default(),
        }
    }
}

impl PriceAdvisor {
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            volatility: VolatilityEstimator::new(config.atr_window)?,
            config,
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// ATR of `series` with the configured window.
    pub fn volatility(&self, series: &Series) -> Result<f64> {
        self.volatility.estimate(series)
    }

    /// Advice for `signal`, computing ATR from `series`. HOLD yields `None`.
    pub fn advise(&self, series: &Series, signal: Signal) -> Result<Option<PriceAdvice>> {
        if signal == Signal::Hold {
            return Ok(None);
        }
        let atr = self.volatility(series)?;
        self.advise_with_atr(series, signal, atr)
    }

    /// Advice for `signal` using an ATR the caller already computed.
    pub fn advise_with_atr(
        &self,
        series: &Series,
        signal: Signal,
        atr: f64,
    ) -> Result<Option<PriceAdvice>> {
        if !(atr >= 0.0) {
            return Err(Error::InvalidData(format!("negative or NaN ATR: {atr}")));
        }
        let cfg = &self.config;
        let last_close = series.last().close;

        match signal {
            Signal::Buy => {
                let limit_price = last_close * (1.0 - cfg.buy_discount);
                Ok(Some(PriceAdvice {
                    limit_price,
                    stop_loss: limit_price - cfg.stop_atr_multiple * atr,
                    take_profit: limit_price + cfg.target_atr_multiple * atr,
                }))
            }
            Signal::Sell => {
                let resistance = self.resistance(series)?;
                let limit_price = (last_close * (1.0 + cfg.sell_premium)).max(resistance);
                // Below resistance the breakout is unconfirmed, so keep the wider stop.
                let stop_multiple = if last_close < resistance {
                    cfg.stop_atr_multiple
                } else {
                    cfg.breakout_stop_atr_multiple
                };
                Ok(Some(PriceAdvice {
                    limit_price,
                    stop_loss: limit_price + stop_multiple * atr,
                    take_profit: limit_price - cfg.target_atr_multiple * atr,
                }))
            }
            Signal::Hold => Ok(None),
        }
    }

    /// Highest high over the trailing resistance window.
    pub fn resistance(&self, series: &Series) -> Result<f64> {
        let window = self.config.resistance_window;
        if series.len() < window {
            return Err(Error::InsufficientData {
                needed: window,
                available: series.len(),
            });
        }
        Ok(series
            .tail(window)
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bar, flat_series, series};

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn buy_scenario() {
        // last close 100, ATR 2
        let s = flat_series(20, 100.0, 1.0);
        let advice = PriceAdvisor::default()
            .advise(&s, Signal::Buy)
            .unwrap()
            .unwrap();
        assert!(close_to(advice.limit_price, 99.5), "{advice:?}");
        assert!(close_to(advice.stop_loss, 95.5), "{advice:?}");
        assert!(close_to(advice.take_profit, 105.5), "{advice:?}");
    }

    #[test]
    fn sell_below_resistance_uses_wide_stop() {
        // Highs reach 52 inside the last five bars; last close 50; ATR forced to 1.
        let mut bars: Vec<_> = (0..15).map(|i| bar(i, 50.0, 50.5, 49.5, 50.0)).collect();
        bars.push(bar(15, 51.0, 52.0, 50.0, 51.0));
        bars.push(bar(16, 50.0, 50.5, 49.5, 50.0));
        let s = series(bars);
        let advisor = PriceAdvisor::default();
        assert_eq!(advisor.resistance(&s).unwrap(), 52.0);

        let advice = advisor.advise_with_atr(&s, Signal::Sell, 1.0).unwrap().unwrap();
        assert!(close_to(advice.limit_price, 52.0), "{advice:?}");
        assert!(close_to(advice.stop_loss, 54.0), "{advice:?}");
        assert!(close_to(advice.take_profit, 49.0), "{advice:?}");
    }

    #[test]
    fn sell_at_resistance_uses_tight_stop() {
        // Last close equals the 5-bar high → breakout confirmed.
        let mut bars: Vec<_> = (0..15).map(|i| bar(i, 50.0, 50.5, 49.5, 50.0)).collect();
        bars.push(bar(15, 50.0, 60.0, 50.0, 60.0));
        let s = series(bars);
        let advice = PriceAdvisor::default()
            .advise_with_atr(&s, Signal::Sell, 1.0)
            .unwrap()
            .unwrap();
        assert!(close_to(advice.limit_price, 60.3), "{advice:?}");
        assert!(close_to(advice.stop_loss, 61.3), "{advice:?}");
        assert!(close_to(advice.take_profit, 57.3), "{advice:?}");
    }

    #[test]
    fn hold_has_no_advice_even_without_history() {
        let s = flat_series(1, 10.0, 0.5);
        assert_eq!(PriceAdvisor::default().advise(&s, Signal::Hold).unwrap(), None);
    }

    #[test]
    fn zero_atr_collapses_to_limit() {
        let s = flat_series(14, 10.0, 0.0);
        let advice = PriceAdvisor::default().advise(&s, Signal::Buy).unwrap().unwrap();
        assert_eq!(advice.stop_loss, advice.limit_price);
        assert_eq!(advice.take_profit, advice.limit_price);
    }

    #[test]
    fn short_history_is_insufficient() {
        let s = flat_series(10, 10.0, 0.5);
        assert!(matches!(
            PriceAdvisor::default().advise(&s, Signal::Buy),
            Err(Error::InsufficientData { needed: 14, available: 10 })
        ));
        assert!(matches!(
            PriceAdvisor::default().advise_with_atr(&flat_series(3, 10.0, 0.5), Signal::Sell, 1.0),
            Err(Error::InsufficientData { needed: 5, available: 3 })
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = AdvisorConfig {
            resistance_window: 0,
            ..AdvisorConfig::default()
        };
        assert!(matches!(PriceAdvisor::new(cfg), Err(Error::Config(_))));
        let cfg = AdvisorConfig {
            stop_atr_multiple: -1.0,
            ..AdvisorConfig::default()
        };
        assert!(PriceAdvisor::new(cfg).is_err());
    }
}
