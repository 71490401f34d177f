use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{Eligibility, EligibilityUpdater, Result};

/// `[eligibility]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub list_path: PathBuf,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            list_path: PathBuf::from("config/blocked.txt"),
        }
    }
}

/// Blocked-instrument list re-read from disk on every refresh.
///
/// One ticker per line; blank lines and `#` comments are ignored. A missing
/// file is an error, so a batch never runs against an unknown list.
pub struct FileEligibilityList {
    path: PathBuf,
}

impl FileEligibilityList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EligibilityUpdater for FileEligibilityList {
    async fn refresh(&self) -> Result<Eligibility> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let list = parse_list(&raw);
        debug!(path = %self.path.display(), blocked = list.blocked_count(), "Eligibility list read");
        Ok(list)
    }
}

fn parse_list(raw: &str) -> Eligibility {
    Eligibility::blocking(
        raw.lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|t| !t.is_empty()),
    )
}
