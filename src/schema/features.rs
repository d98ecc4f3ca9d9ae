//! Plain-text feature list: one feature id per line.

use std::collections::HashSet;
use std::path::Path;

use super::FeatureId;
use crate::error::ArtifactError;

/// Parse a feature list. Lines are trimmed and blank lines are skipped.
pub fn parse_feature_list(text: &str) -> Vec<FeatureId> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Read and parse the feature-list artifact.
pub fn load_feature_list(path: &Path) -> Result<Vec<FeatureId>, ArtifactError> {
    let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let features = parse_feature_list(&text);
    if features.is_empty() {
        return Err(ArtifactError::EmptyFeatureList {
            path: path.to_path_buf(),
        });
    }
    let mut seen = HashSet::with_capacity(features.len());
    if let Some(dup) = features.iter().find(|f| !seen.insert(f.as_str())) {
        return Err(ArtifactError::Invalid(format!(
            "duplicate feature id {dup} in {}",
            path.display()
        )));
    }
    tracing::debug!(path = %path.display(), count = features.len(), "Loaded feature list");
    Ok(features)
}
