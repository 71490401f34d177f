use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use common::{BacktestHarness, BacktestStats, Collaborator, Error, Result};

/// `[backtest]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// JSON file of per-ticker statistics produced by an offline backtest.
    pub stats_path: PathBuf,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            stats_path: PathBuf::from("config/backtest_stats.json"),
        }
    }
}

/// One ticker's entry in the stats file. Percentages as the backtester
/// prints them; drawdown is usually negative.
#[derive(Debug, Deserialize)]
struct StatsEntry {
    win_rate_pct: f64,
    sharpe: f64,
    max_drawdown_pct: f64,
}

impl From<StatsEntry> for BacktestStats {
    fn from(e: StatsEntry) -> Self {
        BacktestStats {
            win_rate: e.win_rate_pct / 100.0,
            sharpe: e.sharpe,
            max_drawdown: e.max_drawdown_pct / 100.0,
        }
    }
}

/// Serves backtest statistics computed elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StatsFileHarness {
    stats: HashMap<String, BacktestStats>,
}

impl StatsFileHarness {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let harness = Self::from_json(&raw)?;
        info!(path = %path.display(), tickers = harness.stats.len(), "Backtest statistics loaded");
        Ok(harness)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: HashMap<String, StatsEntry> = serde_json::from_str(raw)?;
        let mut stats = HashMap::with_capacity(entries.len());
        for (ticker, entry) in entries {
            if ![entry.win_rate_pct, entry.sharpe, entry.max_drawdown_pct]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(Error::InvalidData(format!("non-finite backtest stats for {ticker}")));
            }
            stats.insert(ticker.trim().to_ascii_uppercase(), entry.into());
        }
        Ok(Self { stats })
    }
}

#[async_trait]
impl BacktestHarness for StatsFileHarness {
    async fn run(&self, instrument: &str) -> Result<BacktestStats> {
        self.stats
            .get(&instrument.trim().to_ascii_uppercase())
            .copied()
            .ok_or_else(|| {
                Error::external(Collaborator::Backtest, instrument, "no backtest statistics")
            })
    }
}
