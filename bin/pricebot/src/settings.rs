use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use adapters::{BacktestConfig, ClassifierConfig, EligibilityConfig, RiskTableConfig};
use engine::BatchConfig;
use risk::RiskConfig;
use strategy::StrategyConfig;

/// Domain configuration file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub batch: BatchConfig,
    pub strategy: StrategyConfig,
    pub risk: RiskConfig,
    pub classifier: ClassifierConfig,
    pub risk_scores: RiskTableConfig,
    pub news_scores: RiskTableConfig,
    pub backtest: BacktestConfig,
    pub eligibility: EligibilityConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}
