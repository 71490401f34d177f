use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use common::{Classifier, Error, FeatureVector, Result};

/// `[classifier]` section. Weights apply to (RSI, MA20, MA5, volatility,
/// volume) in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub intercept: f64,
    pub weights: [f64; 5],
}

impl Default for ClassifierConfig {
    /// All-zero weights: every instrument scores 0.5.
    fn default() -> Self {
        Self {
            intercept: 0.0,
            weights: [0.0; 5],
        }
    }
}

/// Logistic regression scoring with pre-fitted coefficients. Inference only.
pub struct LogisticClassifier {
    config: ClassifierConfig,
}

impl LogisticClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let finite = config.intercept.is_finite() && config.weights.iter().all(|w| w.is_finite());
        if !finite {
            return Err(Error::Config("classifier coefficients must be finite".into()));
        }
        Ok(Self { config })
    }

    pub fn probability(&self, features: &FeatureVector) -> Result<f64> {
        let x = features.as_array();
        if x.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!("non-finite feature in {x:?}")));
        }
        let z = self.config.intercept
            + self
                .config
                .weights
                .iter()
                .zip(x.iter())
                .map(|(w, v)| w * v)
                .sum::<f64>();
        Ok(sigmoid(z))
    }
}

#[async_trait]
impl Classifier for LogisticClassifier {
    async fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.probability(features)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
