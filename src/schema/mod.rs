//! Feature schema — the model's expected input order and the order questions
//! are shown in.
//!
//! Everything here is resolved once at startup and is read-only afterwards.

pub mod features;
pub mod questions;
pub mod reconcile;

pub use features::{load_feature_list, parse_feature_list};
pub use questions::{QuestionBook, DEFAULT_DISPLAY_ORDER};
pub use reconcile::{reconcile, resolve_train_order, TrainOrderSource};

/// Canonical string key for one model input column.
pub type FeatureId = String;
