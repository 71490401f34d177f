pub mod config;
pub mod error;
pub mod ports;
pub mod types;

pub use config::{Config, DataSourceKind};
pub use error::{Collaborator, Error, Result};
pub use ports::{
    BacktestHarness, Classifier, Eligibility, EligibilityUpdater, MarketDataSource,
    NewsRiskSource, RiskModel,
};
pub use types::*;
