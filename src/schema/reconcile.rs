//! Display-order reconciliation against the model's training order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::FeatureId;

/// Where the training order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainOrderSource {
    /// Input names recorded inside the model artifact.
    Model,
    /// The plain-text feature list next to the model.
    FeatureFile,
}

impl std::fmt::Display for TrainOrderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::FeatureFile => write!(f, "feature_file"),
        }
    }
}

/// Compute the display order: preferred entries the model knows about, in
/// preferred order, then every remaining training feature in training order.
///
/// The result is always a permutation of `train_order`.
pub fn reconcile<P, T>(preferred: &[P], train_order: &[T]) -> Vec<FeatureId>
where
    P: AsRef<str>,
    T: AsRef<str>,
{
    let train: HashSet<&str> = train_order.iter().map(AsRef::as_ref).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(train_order.len());
    let mut order = Vec::with_capacity(train_order.len());

    for feature in preferred.iter().map(AsRef::as_ref) {
        if train.contains(feature) && seen.insert(feature) {
            order.push(feature.to_string());
        }
    }
    for feature in train_order.iter().map(AsRef::as_ref) {
        if seen.insert(feature) {
            order.push(feature.to_string());
        }
    }

    order
}

/// Pick the authoritative training order.
///
/// Names recorded by the model win; the feature file is the fallback when the
/// model carries none.
pub fn resolve_train_order(
    model_names: Option<&[FeatureId]>,
    file_list: &[FeatureId],
) -> (Vec<FeatureId>, TrainOrderSource) {
    match model_names {
        Some(names) if !names.is_empty() => {
            let recorded: HashSet<&str> = names.iter().map(String::as_str).collect();
            let listed: HashSet<&str> = file_list.iter().map(String::as_str).collect();
            if recorded != listed {
                warn!(
                    model = names.len(),
                    file = file_list.len(),
                    "Feature file disagrees with the model's recorded inputs; using the model"
                );
            }
            info!(features = names.len(), source = %TrainOrderSource::Model, "Resolved training order");
            (names.to_vec(), TrainOrderSource::Model)
        }
        _ => {
            info!(
                features = file_list.len(),
                source = %TrainOrderSource::FeatureFile,
                "Resolved training order"
            );
            (file_list.to_vec(), TrainOrderSource::FeatureFile)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<FeatureId> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn preferred_first_then_train_tail() {
        let preferred = ["C", "X", "A"];
        let train = ["A", "B", "C", "D"];
        assert_eq!(reconcile(&preferred, &train), ids(&["C", "A", "B", "D"]));
    }

    #[test]
    fn identical_orders_are_unchanged() {
        let order = ["A", "B", "C"];
        assert_eq!(reconcile(&order, &order), ids(&order));
    }

    #[test]
    fn empty_preferred_yields_train_order() {
        let preferred: [&str; 0] = [];
        let train = ["B", "A"];
        assert_eq!(reconcile(&preferred, &train), ids(&["B", "A"]));
    }

    #[test]
    fn duplicated_preferred_entry_appears_once() {
        let preferred = ["B", "B", "A"];
        let train = ["A", "B"];
        assert_eq!(reconcile(&preferred, &train), ids(&["B", "A"]));
    }

    #[test]
    fn result_is_permutation_with_partitioned_order() {
        let cases: Vec<(Vec<&str>, Vec<&str>)> = vec![
            (vec!["e", "a", "z", "c"], vec!["a", "b", "c", "d", "e"]),
            (vec!["q", "r"], vec!["a", "b"]),
            (vec!["b", "a"], vec!["a", "b"]),
            (vec![], vec!["x"]),
            (vec!["x"], vec![]),
        ];

        for (preferred, train) in cases {
            let out = reconcile(&preferred, &train);

            let mut sorted_out = out.clone();
            sorted_out.sort();
            let mut sorted_train = ids(&train);
            sorted_train.sort();
            assert_eq!(sorted_out, sorted_train, "not a permutation: {preferred:?} / {train:?}");

            let head: Vec<&str> = preferred
                .iter()
                .copied()
                .filter(|f| train.contains(f))
                .collect();
            let tail: Vec<&str> = train
                .iter()
                .copied()
                .filter(|f| !preferred.contains(f))
                .collect();
            let expected: Vec<FeatureId> = head.into_iter().chain(tail).map(String::from).collect();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn model_names_take_precedence() {
        let model = ids(&["B", "A"]);
        let file = ids(&["A", "B"]);
        let (order, source) = resolve_train_order(Some(model.as_slice()), &file);
        assert_eq!(order, model);
        assert_eq!(source, TrainOrderSource::Model);
    }

    #[test]
    fn falls_back_to_feature_file() {
        let file = ids(&["A", "B"]);
        let (order, source) = resolve_train_order(None, &file);
        assert_eq!(order, file);
        assert_eq!(source, TrainOrderSource::FeatureFile);

        let empty: Vec<FeatureId> = Vec::new();
        let (order, source) = resolve_train_order(Some(empty.as_slice()), &file);
        assert_eq!(order, file);
        assert_eq!(source, TrainOrderSource::FeatureFile);
    }
}
