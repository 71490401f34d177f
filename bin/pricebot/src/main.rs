mod settings;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adapters::{
    CsvMarketData, FileEligibilityList, LogisticClassifier, StaticRiskTable, StatsFileHarness,
    YahooMarketData,
};
use common::{Config, DataSourceKind, MarketDataSource};
use engine::{render_table, BatchOrchestrator, Collaborators};
use strategy::build_strategy;

use crate::settings::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(config = %cfg.config_path.display(), source = %cfg.data_source, "Pricebot starting");
    let mut app = AppConfig::load(&cfg.config_path)?;
    if let Some(universe) = cfg.universe_override.clone() {
        app.batch.universe = universe;
    }

    // ── Collaborators ─────────────────────────────────────────────────────────
    let market_data: Arc<dyn MarketDataSource> = match &cfg.data_source {
        DataSourceKind::Yahoo => Arc::new(YahooMarketData::new().context("building HTTP client")?),
        DataSourceKind::Csv { dir } => Arc::new(CsvMarketData::new(dir)),
    };
    let backtest = StatsFileHarness::load(&app.backtest.stats_path).with_context(|| {
        format!("loading backtest stats from {}", app.backtest.stats_path.display())
    })?;
    let collaborators = Collaborators {
        market_data,
        classifier: Arc::new(LogisticClassifier::new(app.classifier.clone())?),
        risk_model: Arc::new(StaticRiskTable::new(app.risk_scores.clone())),
        news_risk: Arc::new(StaticRiskTable::new(app.news_scores.clone())),
        backtest: Arc::new(backtest),
        eligibility: Arc::new(FileEligibilityList::new(app.eligibility.list_path.clone())),
    };

    // ── Strategy + orchestrator ───────────────────────────────────────────────
    let strategy = build_strategy(&app.strategy).context("building strategy")?;
    let mut orchestrator = BatchOrchestrator::new(collaborators, strategy, app.risk, app.batch)
        .context("building orchestrator")?;

    // ── Run ───────────────────────────────────────────────────────────────────
    let report = orchestrator.run_universe().await.context("batch aborted")?;
    for skipped in &report.skipped {
        warn!(ticker = %skipped.ticker, reason = %skipped.reason, "Omitted from report");
    }

    println!("## Price advice ({})\n", report.run_id);
    println!("{}", render_table(&report.rows));
    info!(rows = report.rows.len(), skipped = report.skipped.len(), "Done");
    Ok(())
}
