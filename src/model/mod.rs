//! Classification model — the opaque scorer behind the questionnaire.

pub mod classifier;
pub mod pipeline;

pub use classifier::{positive_probability, Classifier};
pub use pipeline::{LogisticPipeline, LogisticRegression, StandardScaler};
