use crate::domain::errors::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default settings location, matching the pipeline layout the report
/// runs from.
pub const DEFAULT_SETTINGS_PATH: &str = ".pipelines/variables/appsettings.json";

/// Environment variable overriding the settings file location.
pub const SETTINGS_PATH_ENV: &str = "SONARPOST_SETTINGS";

/// Static run settings, loaded once at startup and passed explicitly to
/// the fetcher and publisher. Key names follow the settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "SONARQUBE_URL")]
    pub sonarqube_url: String,
    #[serde(rename = "SONARQUBE_TOKEN")]
    pub sonarqube_token: String,
    #[serde(rename = "PROJECT_IDS")]
    pub project_ids: Vec<String>,
    #[serde(rename = "SLACK_WEBHOOK_URL")]
    pub slack_webhook_url: String,
}

impl Config {
    /// Load settings from `SONARPOST_SETTINGS`, falling back to the
    /// default pipeline path.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH));
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "Loaded settings from {:?} ({} projects)",
            path,
            config.project_ids.len()
        );
        Ok(config)
    }
}
