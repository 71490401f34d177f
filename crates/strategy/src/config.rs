use serde::{Deserialize, Serialize};

use crate::advisor::AdvisorConfig;
use crate::router::Thresholds;

/// Which signal-generation variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Position-agnostic routing, used for the batch report.
    #[default]
    Base,
    /// Enters only when flat and exits only when long.
    Enhanced,
}

impl Variant {
    pub fn default_thresholds(self) -> Thresholds {
        match self {
            Variant::Base => Thresholds::REPORT,
            Variant::Enhanced => Thresholds::ENTRY_EXIT,
        }
    }
}

/// `[strategy]` section of the pricebot config file.
///
/// ```toml
/// [strategy]
/// variant = "enhanced"
/// name = "Swing entries"
///
/// [strategy.thresholds]
/// buy = 0.65
/// sell = 0.35
///
/// [strategy.advisor]
/// resistance_window = 5
/// stop_atr_multiple = 2.0
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub variant: Variant,
    /// Name shown in logs. Defaults to the variant name.
    pub name: Option<String>,
    /// Overrides the variant's default threshold pair.
    pub thresholds: Option<Thresholds>,
    pub advisor: AdvisorConfig,
}

impl StrategyConfig {
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
            .unwrap_or_else(|| self.variant.default_thresholds())
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| match self.variant {
            Variant::Base => "base".to_string(),
            Variant::Enhanced => "enhanced".to_string(),
        })
    }
}
