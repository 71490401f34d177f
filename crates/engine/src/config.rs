use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// `[batch]` section: what to evaluate and how hard to push collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Tickers evaluated on each run, in report order.
    pub universe: Vec<String>,
    /// History requested from the market-data source, e.g. "1mo".
    pub period: String,
    /// Bar size, e.g. "1d".
    pub interval: String,
    /// Account equity used to size new entries.
    pub equity: f64,
    /// Instruments evaluated at the same time.
    pub max_concurrency: usize,
    /// Upper bound on any single collaborator call.
    pub call_timeout_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            universe: Vec::new(),
            period: "1mo".to_string(),
            interval: "1d".to_string(),
            equity: 100_000.0,
            max_concurrency: 4,
            call_timeout_secs: 30,
        }
    }
}

impl BatchConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::Config("max_concurrency must be >= 1".into()));
        }
        let mut seen = HashSet::with_capacity(self.universe.len());
        if let Some(dup) = self.universe.iter().find(|t| !seen.insert(t.as_str())) {
            return Err(Error::Config(format!("ticker '{dup}' listed twice in universe")));
        }
        if self.call_timeout_secs == 0 {
            return Err(Error::Config("call_timeout_secs must be >= 1".into()));
        }
        if !(self.equity >= 0.0) || !self.equity.is_finite() {
            return Err(Error::Config(format!("equity must be >= 0, got {}", self.equity)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_daily_month_window() {
        let cfg: BatchConfig = toml::from_str(r#"universe = ["AAPL", "MSFT"]"#).unwrap();
        assert_eq!(cfg.period, "1mo");
        assert_eq!(cfg.interval, "1d");
        assert_eq!(cfg.universe.len(), 2);
        assert_eq!(cfg.call_timeout(), Duration::from_secs(30));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let cfg = BatchConfig {
            max_concurrency: 0,
            ..BatchConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn duplicate_ticker_rejected() {
        let cfg = BatchConfig {
            universe: vec!["AAPL".into(), "MSFT".into(), "AAPL".into()],
            ..BatchConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(msg)) if msg.contains("AAPL")));
    }
}
