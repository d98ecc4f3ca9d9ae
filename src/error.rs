//! Error types for the HLMC questionnaire.

use std::path::PathBuf;

use uuid::Uuid;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while loading the model or feature-list artifacts.
///
/// Every variant is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error(
        "Missing model or feature file: {}. Keep the model file and the feature list in the SAME folder ({}).",
        display_paths(.missing),
        .dir.display()
    )]
    Missing { missing: Vec<PathBuf>, dir: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error("Feature list {path} is empty")]
    EmptyFeatureList { path: PathBuf },
}

/// Incomplete-answer warnings. Recoverable: the state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select Yes or No before continuing.")]
    Unanswered { feature: String },

    #[error("Please answer all questions first.")]
    Incomplete { unanswered: Vec<String> },
}

/// Failures from the classification pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Model expects {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Model produced an invalid probability: {0}")]
    OutOfRange(f64),
}

/// Errors from a single wizard transition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(
        "Feature mismatch with the trained model (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Action {action} is not available at question {} of {total}", .index + 1)]
    NotAvailable {
        action: String,
        index: usize,
        total: usize,
    },

    #[error("Cannot answer {got}: the current question is {expected}")]
    WrongQuestion { expected: String, got: String },
}

impl WizardError {
    /// Whether this is a user-recoverable warning rather than a failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Session store errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Session {id} not found")]
    NotFound { id: Uuid },

    #[error(transparent)]
    Wizard(#[from] WizardError),
}
