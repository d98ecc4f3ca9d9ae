//! Classifier trait — abstracts over the scoring artifact.

use crate::error::InferenceError;
use crate::schema::FeatureId;

/// A binary classifier over an ordered numeric feature vector.
pub trait Classifier: Send + Sync {
    /// Class probabilities `[P(class0), P(class1)]` for one row whose values
    /// follow the training order.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// Input names recorded at training time, if the artifact kept them.
    fn feature_names(&self) -> Option<&[FeatureId]> {
        None
    }
}

/// Run the classifier and return the positive-class probability.
pub fn positive_probability(
    classifier: &dyn Classifier,
    features: &[f64],
) -> Result<f64, InferenceError> {
    let [_, positive] = classifier.predict_proba(features)?;
    if !positive.is_finite() || !(0.0..=1.0).contains(&positive) {
        return Err(InferenceError::OutOfRange(positive));
    }
    Ok(positive)
}
