use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use common::{NewsRiskSource, Result, RiskModel, RiskScore};

/// `[risk_scores]` / `[news_scores]` sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTableConfig {
    /// Score for tickers without an entry.
    pub default: RiskScore,
    pub scores: HashMap<String, RiskScore>,
}

impl Default for RiskTableConfig {
    fn default() -> Self {
        Self {
            default: RiskScore::ZERO,
            scores: HashMap::new(),
        }
    }
}

/// Fixed per-ticker risk scores. Serves as either the risk model or the
/// news-risk source.
#[derive(Debug, Clone)]
pub struct StaticRiskTable {
    default: RiskScore,
    scores: HashMap<String, RiskScore>,
}

impl StaticRiskTable {
    pub fn new(config: RiskTableConfig) -> Self {
        let scores = config
            .scores
            .into_iter()
            .map(|(ticker, score)| (ticker.trim().to_ascii_uppercase(), score))
            .collect();
        Self {
            default: config.default,
            scores,
        }
    }

    pub fn lookup(&self, instrument: &str) -> RiskScore {
        self.scores
            .get(&instrument.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or(self.default)
    }
}

#[async_trait]
impl RiskModel for StaticRiskTable {
    async fn score(&self, instrument: &str) -> Result<RiskScore> {
        Ok(self.lookup(instrument))
    }
}

#[async_trait]
impl NewsRiskSource for StaticRiskTable {
    async fn score(&self, instrument: &str) -> Result<RiskScore> {
        Ok(self.lookup(instrument))
    }
}
