use std::time::Duration;

use thiserror::Error;

/// Which external collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    MarketData,
    Classifier,
    RiskModel,
    NewsRisk,
    Backtest,
    Eligibility,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collaborator::MarketData => write!(f, "market data"),
            Collaborator::Classifier => write!(f, "classifier"),
            Collaborator::RiskModel => write!(f, "risk model"),
            Collaborator::NewsRisk => write!(f, "news risk"),
            Collaborator::Backtest => write!(f, "backtest"),
            Collaborator::Eligibility => write!(f, "eligibility list"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Insufficient data: need {needed} bars, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("{collaborator} call failed for {instrument}: {reason}")]
    ExternalCall {
        collaborator: Collaborator,
        instrument: String,
        reason: String,
    },

    #[error("{collaborator} call for {instrument} timed out after {after:?}")]
    Timeout {
        collaborator: Collaborator,
        instrument: String,
        after: Duration,
    },

    #[error("Invalid signal: '{0}'")]
    InvalidSignal(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn external(
        collaborator: Collaborator,
        instrument: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Error::ExternalCall {
            collaborator,
            instrument: instrument.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
