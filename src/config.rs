//! Configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default model artifact file name, looked up inside the artifact directory.
pub const DEFAULT_MODEL_FILE: &str = "top20_lasso_pipeline.json";

/// Default feature-list file name.
pub const DEFAULT_FEATURES_FILE: &str = "top20_features.txt";

/// Where the model and feature-list artifacts live.
///
/// Both files are expected side by side in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub model_file: String,
    pub features_file: String,
}

impl ArtifactPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            features_file: DEFAULT_FEATURES_FILE.to_string(),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn features_path(&self) -> PathBuf {
        self.dir.join(&self.features_file)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Model + feature-list location.
    pub artifacts: ArtifactPaths,
    /// HTTP port for the JSON API.
    pub port: u16,
    /// Sessions idle for longer than this are discarded.
    pub session_idle_timeout: Duration,
    /// How often the idle sweep runs.
    pub sweep_interval: Duration,
    /// Whether to run the interactive terminal questionnaire on stdin.
    pub cli_enabled: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            port: 8080,
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            sweep_interval: Duration::from_secs(60),
            cli_enabled: true,
        }
    }
}

impl WizardConfig {
    /// Build configuration from `HLMC_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparseable values are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`WizardConfig::from_env`] but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("HLMC_ARTIFACT_DIR") {
            config.artifacts.dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("HLMC_MODEL_FILE") {
            config.artifacts.model_file = file;
        }
        if let Some(file) = lookup("HLMC_FEATURES_FILE") {
            config.artifacts.features_file = file;
        }
        if let Some(port) = parse_var::<u16>(&lookup, "HLMC_PORT") {
            config.port = port;
        }
        if let Some(minutes) = parse_var::<u64>(&lookup, "HLMC_SESSION_IDLE_MIN") {
            config.session_idle_timeout = Duration::from_secs(minutes * 60);
        }
        if let Some(enabled) = parse_var::<bool>(&lookup, "HLMC_CLI") {
            config.cli_enabled = enabled;
        }

        config
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}
