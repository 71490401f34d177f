use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::{stream, StreamExt};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use common::{Collaborator, Error, Position, Result, ResultRow};
use risk::{PositionManager, RiskConfig, RiskGate};
use strategy::Strategy;

use crate::config::BatchConfig;
use crate::pipeline::{Collaborators, InstrumentPipeline};

/// An instrument left out of the report, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedInstrument {
    pub ticker: String,
    pub reason: String,
}

/// Outcome of one batch run. Always produced once the eligibility refresh
/// succeeds, however many instruments fail.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub run_id: String,
    /// Successful rows, in universe order.
    pub rows: Vec<ResultRow>,
    pub skipped: Vec<SkippedInstrument>,
}

/// Drives the per-instrument pipeline over a universe.
///
/// Instruments run concurrently up to `max_concurrency`. Each one owns its
/// `PositionManager` for the duration of its evaluation; managers persist in
/// the orchestrator between runs.
pub struct BatchOrchestrator {
    pipeline: Arc<InstrumentPipeline>,
    config: BatchConfig,
    risk_config: RiskConfig,
    positions: HashMap<String, PositionManager>,
}

impl BatchOrchestrator {
    pub fn new(
        collaborators: Collaborators,
        strategy: Arc<dyn Strategy>,
        risk_config: RiskConfig,
        config: BatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        risk_config.validate()?;
        let pipeline = InstrumentPipeline::new(
            collaborators,
            strategy,
            RiskGate::new(risk_config.override_threshold),
            config.period.clone(),
            config.interval.clone(),
            config.equity,
            config.call_timeout(),
        );
        Ok(Self {
            pipeline: Arc::new(pipeline),
            config,
            risk_config,
            positions: HashMap::new(),
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Current position for `ticker`, if it has been evaluated.
    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker).map(|m| m.position())
    }

    /// Evaluate the configured universe.
    pub async fn run_universe(&mut self) -> Result<BatchReport> {
        let universe = self.config.universe.clone();
        self.run(&universe).await
    }

    /// Evaluate `instruments`. Only a failed eligibility refresh aborts the
    /// run; every per-instrument failure is logged and the instrument omitted.
    pub async fn run(&mut self, instruments: &[String]) -> Result<BatchReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("batch", run_id = %run_id);
        self.run_inner(run_id, instruments).instrument(span).await
    }

    async fn run_inner(&mut self, run_id: String, instruments: &[String]) -> Result<BatchReport> {
        info!(instruments = instruments.len(), "Batch starting");

        let timeout = self.pipeline.timeout();
        let eligibility = tokio::time::timeout(
            timeout,
            self.pipeline.collaborators.eligibility.refresh(),
        )
        .await
        .map_err(|_| Error::Timeout {
            collaborator: Collaborator::Eligibility,
            instrument: "*".to_string(),
            after: timeout,
        })??;
        info!(blocked = eligibility.blocked_count(), "Eligibility list refreshed");

        let mut skipped = Vec::new();
        let mut jobs = Vec::with_capacity(instruments.len());
        let mut seen = HashSet::with_capacity(instruments.len());
        for ticker in instruments {
            // One manager per ticker: a repeat would race the first for it.
            if !seen.insert(ticker.as_str()) {
                warn!(ticker = %ticker, "Duplicate instrument in batch, skipping");
                skipped.push(SkippedInstrument {
                    ticker: ticker.clone(),
                    reason: "duplicate".to_string(),
                });
                continue;
            }
            if !eligibility.is_eligible(ticker) {
                warn!(ticker = %ticker, "Instrument is not eligible, skipping");
                skipped.push(SkippedInstrument {
                    ticker: ticker.clone(),
                    reason: "not eligible".to_string(),
                });
                continue;
            }
            let manager = match self.positions.remove(ticker) {
                Some(m) => m,
                None => PositionManager::new(ticker.as_str(), self.risk_config)?,
            };
            jobs.push((ticker.clone(), manager));
        }

        let pipeline = self.pipeline.clone();
        // `buffered` keeps universe order while running up to N at once.
        let outcomes: Vec<(String, PositionManager, Result<ResultRow>)> = stream::iter(jobs)
            .map(|(ticker, mut manager)| {
                let pipeline = pipeline.clone();
                async move {
                    let outcome = pipeline.evaluate(&ticker, &mut manager).await;
                    (ticker, manager, outcome)
                }
            })
            .buffered(self.config.max_concurrency)
            .collect()
            .await;

        let mut rows = Vec::with_capacity(outcomes.len());
        for (ticker, manager, outcome) in outcomes {
            self.positions.insert(ticker.clone(), manager);
            match outcome {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "Error processing instrument, skipping");
                    skipped.push(SkippedInstrument {
                        ticker,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(rows = rows.len(), skipped = skipped.len(), "Batch complete");
        Ok(BatchReport { run_id, rows, skipped })
    }
}
