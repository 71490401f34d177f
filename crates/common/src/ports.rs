use std::collections::HashSet;

use async_trait::async_trait;

use crate::{BacktestStats, FeatureVector, Result, RiskScore, Series};

// Collaborators the decision engine depends on but does not implement.
// The orchestrator holds each as an `Arc<dyn _>` built once per process, and
// wraps every call in a timeout.

/// Source of OHLCV history.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch bars for `instrument` covering `period` (e.g. "1mo") sampled at
    /// `interval` (e.g. "1d"), oldest first.
    async fn fetch(&self, instrument: &str, period: &str, interval: &str) -> Result<Series>;
}

/// Probability model for an upward move.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Probability in `[0, 1]` that price moves up.
    async fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

/// Instrument-level risk model.
#[async_trait]
pub trait RiskModel: Send + Sync {
    async fn score(&self, instrument: &str) -> Result<RiskScore>;
}

/// Risk derived from recent news flow, on the same scale as `RiskModel`.
#[async_trait]
pub trait NewsRiskSource: Send + Sync {
    async fn score(&self, instrument: &str) -> Result<RiskScore>;
}

/// Replays history through a strategy elsewhere and reports the aggregate.
#[async_trait]
pub trait BacktestHarness: Send + Sync {
    async fn run(&self, instrument: &str) -> Result<BacktestStats>;
}

/// Refreshes the sanctions / eligibility list. Called once per batch.
#[async_trait]
pub trait EligibilityUpdater: Send + Sync {
    async fn refresh(&self) -> Result<Eligibility>;
}

/// Instruments that must not be evaluated in the current batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eligibility {
    blocked: HashSet<String>,
}

impl Eligibility {
    pub fn blocking<I, S>(instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked: instruments
                .into_iter()
                .map(|s| s.into().trim().to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn is_eligible(&self, instrument: &str) -> bool {
        !self.blocked.contains(&instrument.trim().to_ascii_uppercase())
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }
}
