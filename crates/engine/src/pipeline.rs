use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use common::{
    BacktestHarness, Classifier, Collaborator, EligibilityUpdater, Error, MarketDataSource,
    NewsRiskSource, Result, ResultRow, RiskModel,
};
use risk::{PositionManager, RiskGate};
use strategy::{feature_vector, Strategy};

/// External services one batch run depends on. Built once per process and
/// shared read-only by every instrument task.
#[derive(Clone)]
pub struct Collaborators {
    pub market_data: Arc<dyn MarketDataSource>,
    pub classifier: Arc<dyn Classifier>,
    pub risk_model: Arc<dyn RiskModel>,
    pub news_risk: Arc<dyn NewsRiskSource>,
    pub backtest: Arc<dyn BacktestHarness>,
    pub eligibility: Arc<dyn EligibilityUpdater>,
}

/// Evaluates a single instrument end to end.
///
/// Order matters: the risk gate runs before the classifier, so a forced exit
/// never waits on (or is contradicted by) model inference. Every collaborator
/// call completes before the position is touched.
pub struct InstrumentPipeline {
    pub(crate) collaborators: Collaborators,
    strategy: Arc<dyn Strategy>,
    gate: RiskGate,
    period: String,
    interval: String,
    equity: f64,
    timeout: Duration,
}

impl InstrumentPipeline {
    pub fn new(
        collaborators: Collaborators,
        strategy: Arc<dyn Strategy>,
        gate: RiskGate,
        period: impl Into<String>,
        interval: impl Into<String>,
        equity: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            collaborators,
            strategy,
            gate,
            period: period.into(),
            interval: interval.into(),
            equity,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn evaluate(&self, ticker: &str, position: &mut PositionManager) -> Result<ResultRow> {
        let c = &self.collaborators;

        let series = self
            .call(
                Collaborator::MarketData,
                ticker,
                c.market_data.fetch(ticker, &self.period, &self.interval),
            )
            .await?;
        // Recomputed every evaluation; the trailing stop below uses this value.
        let atr = self.strategy.compute_volatility(&series)?;

        let model_risk = self
            .call(Collaborator::RiskModel, ticker, c.risk_model.score(ticker))
            .await?;
        let news_risk = self
            .call(Collaborator::NewsRisk, ticker, c.news_risk.score(ticker))
            .await?;
        let gate = self.gate.gate(model_risk, news_risk);

        let decision = if gate.overridden {
            self.strategy.risk_exit(&series, atr)?
        } else {
            let features = feature_vector(&series, atr)?;
            let probability = self
                .call(Collaborator::Classifier, ticker, c.classifier.predict(&features))
                .await?;
            if !(0.0..=1.0).contains(&probability) {
                return Err(Error::external(
                    Collaborator::Classifier,
                    ticker,
                    format!("probability {probability} outside [0, 1]"),
                ));
            }
            self.strategy
                .evaluate(&series, atr, probability, position.state())?
        };
        debug!(
            ticker,
            signal = %decision.signal,
            confidence = decision.confidence,
            atr,
            total_risk = gate.total_risk.value(),
            "Decision computed"
        );

        let stats = self
            .call(Collaborator::Backtest, ticker, c.backtest.run(ticker))
            .await?;

        // Sized on the model score, the same one the report shows. Changes are
        // staged on a copy so an instrument that errors out keeps its state.
        let mut next = position.clone();
        next.apply(&decision, self.equity, model_risk)?;
        next.update_trailing_stop(series.last().close, atr)?;
        *position = next;

        info!(
            ticker,
            signal = %decision.signal,
            confidence = decision.confidence,
            risk_override = decision.risk_override,
            "Instrument evaluated"
        );

        Ok(ResultRow {
            ticker: ticker.to_string(),
            signal: decision.signal,
            confidence: decision.confidence,
            advice: decision.advice,
            risk_score: model_risk,
            stats,
        })
    }

    /// Run one collaborator call under the per-call timeout. Failures are
    /// tagged with the collaborator and instrument.
    pub(crate) async fn call<T, F>(&self, collaborator: Collaborator, ticker: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e @ Error::ExternalCall { .. })) | Ok(Err(e @ Error::Timeout { .. })) => Err(e),
            Ok(Err(other)) => Err(Error::external(collaborator, ticker, other)),
            Err(_) => Err(Error::Timeout {
                collaborator,
                instrument: ticker.to_string(),
                after: self.timeout,
            }),
        }
    }
}
