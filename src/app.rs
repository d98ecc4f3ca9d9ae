//! Startup — load artifacts and assemble the shared questionnaire.

use std::sync::Arc;

use tracing::info;

use crate::config::ArtifactPaths;
use crate::error::ArtifactError;
use crate::model::{Classifier, LogisticPipeline};
use crate::schema::{load_feature_list, resolve_train_order, QuestionBook, DEFAULT_DISPLAY_ORDER};
use crate::wizard::Questionnaire;

/// Fail unless both artifacts exist side by side.
pub fn ensure_artifacts(paths: &ArtifactPaths) -> Result<(), ArtifactError> {
    let missing: Vec<_> = [paths.model_path(), paths.features_path()]
        .into_iter()
        .filter(|p| !p.is_file())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            missing,
            dir: paths.dir().to_path_buf(),
        })
    }
}

/// Load the model and feature list and build the HLMC questionnaire.
pub fn load_questionnaire(paths: &ArtifactPaths) -> Result<Questionnaire, ArtifactError> {
    ensure_artifacts(paths)?;

    let pipeline = LogisticPipeline::load(&paths.model_path())?;
    let file_list = load_feature_list(&paths.features_path())?;
    let (train_order, source) = resolve_train_order(pipeline.feature_names(), &file_list);

    if train_order.len() != pipeline.n_features() {
        return Err(ArtifactError::Invalid(format!(
            "model expects {} inputs but the training order ({source}) lists {}",
            pipeline.n_features(),
            train_order.len()
        )));
    }

    let classifier: Arc<dyn Classifier> = Arc::new(pipeline);
    let questionnaire = Questionnaire::new(
        DEFAULT_DISPLAY_ORDER,
        train_order,
        QuestionBook::hlmc(),
        classifier,
    )?;

    info!(
        questions = questionnaire.len(),
        train_order_source = %source,
        dir = %paths.dir().display(),
        "Questionnaire loaded"
    );
    Ok(questionnaire)
}
