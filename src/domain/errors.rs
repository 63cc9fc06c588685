use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path:?} is not a valid settings document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while pulling metrics from the analysis server
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("metrics request for project {project_id} failed with status {status}")]
    Status {
        project_id: String,
        status: StatusCode,
    },

    #[error("request to the analysis server failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response for project {project_id}: {reason}")]
    Decode { project_id: String, reason: String },
}

/// Errors raised while posting the rendered report to the webhook
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("webhook rejected the report with status {status}")]
    Status { status: StatusCode },

    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_formatting() {
        let error = FetchError::Status {
            project_id: "team:billing-api".to_string(),
            status: StatusCode::FORBIDDEN,
        };

        let msg = error.to_string();
        assert!(msg.contains("team:billing-api"));
        assert!(msg.contains("403"));
    }

    #[test]
    fn test_publish_error_formatting() {
        let error = PublishError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };

        let msg = error.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("webhook"));
    }
}
