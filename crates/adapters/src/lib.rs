//! Concrete collaborators wired into the batch engine by the binary.

pub mod backtest;
pub mod classifier;
pub mod csv_source;
pub mod eligibility;
pub mod risk_table;
pub mod yahoo;

pub use backtest::{BacktestConfig, StatsFileHarness};
pub use classifier::{ClassifierConfig, LogisticClassifier};
pub use csv_source::CsvMarketData;
pub use eligibility::{EligibilityConfig, FileEligibilityList};
pub use risk_table::{RiskTableConfig, StaticRiskTable};
pub use yahoo::YahooMarketData;
