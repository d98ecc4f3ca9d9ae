//! Serialized scaler + L1 logistic regression pipeline.
//!
//! The artifact is JSON:
//!
//! ```json
//! {
//!   "scaler": { "mean": [0.4, 0.1], "scale": [0.49, 0.3] },
//!   "clf": {
//!     "coef": [1.2, -0.8],
//!     "intercept": -0.3,
//!     "feature_names_in": ["C2_HLMC_heard_1.0", "D5_Health_pay_1.0"]
//!   }
//! }
//! ```
//!
//! `scaler` and `feature_names_in` are optional.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use crate::error::{ArtifactError, InferenceError};
use crate::schema::FeatureId;

/// Per-column standardisation: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Linear logit model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<FeatureId>>,
}

/// The full scoring pipeline as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticPipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
    pub clf: LogisticRegression,
}

impl LogisticPipeline {
    /// Load and validate a pipeline artifact.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pipeline: Self = serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        pipeline.validate()?;
        tracing::debug!(
            path = %path.display(),
            inputs = pipeline.n_features(),
            scaled = pipeline.scaler.is_some(),
            "Loaded model pipeline"
        );
        Ok(pipeline)
    }

    /// Number of inputs the model expects.
    pub fn n_features(&self) -> usize {
        self.clf.coef.len()
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let n = self.n_features();
        if n == 0 {
            return Err(ArtifactError::Invalid("model has no coefficients".into()));
        }
        if self.clf.coef.iter().any(|c| !c.is_finite()) || !self.clf.intercept.is_finite() {
            return Err(ArtifactError::Invalid("non-finite coefficient".into()));
        }

        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(ArtifactError::Invalid(format!(
                    "scaler has {} means and {} scales for {} coefficients",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    n
                )));
            }
            if scaler.mean.iter().any(|m| !m.is_finite()) {
                return Err(ArtifactError::Invalid("non-finite scaler mean".into()));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(ArtifactError::Invalid(
                    "scaler scale must be finite and non-zero".into(),
                ));
            }
        }

        if let Some(names) = &self.clf.feature_names_in {
            if names.len() != n {
                return Err(ArtifactError::Invalid(format!(
                    "{} feature names for {} coefficients",
                    names.len(),
                    n
                )));
            }
            let mut seen = HashSet::with_capacity(n);
            if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(ArtifactError::Invalid(format!("duplicate feature name {dup}")));
            }
        }

        Ok(())
    }

    fn logit(&self, features: &[f64]) -> f64 {
        let coef = &self.clf.coef;
        let linear: f64 = match &self.scaler {
            Some(scaler) => features
                .iter()
                .zip(scaler.mean.iter().zip(&scaler.scale))
                .zip(coef)
                .map(|((x, (mean, scale)), c)| c * (x - mean) / scale)
                .sum(),
            None => features.iter().zip(coef).map(|(x, c)| c * x).sum(),
        };
        self.clf.intercept + linear
    }
}

/// Logistic function without overflow for large |z|.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticPipeline {
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                expected,
                got: features.len(),
            });
        }
        let positive = sigmoid(self.logit(features));
        Ok([1.0 - positive, positive])
    }

    fn feature_names(&self) -> Option<&[FeatureId]> {
        self.clf.feature_names_in.as_deref()
    }
}
