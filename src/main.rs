//! sonarpost - scheduled SonarQube quality report
//!
//! Pulls bugs, vulnerabilities, code smells, coverage and the
//! quality-gate verdict for every configured project and posts one
//! Block Kit message to the team webhook. One invocation, one report.
//!
//! # Usage
//! ```sh
//! SONARPOST_SETTINGS=appsettings.json cargo run
//! ```
//!
//! # Environment Variables
//! - `SONARPOST_SETTINGS` - settings file path
//!   (default: `.pipelines/variables/appsettings.json`)

use anyhow::Result;
use sonarpost::application::report;
use sonarpost::config::Config;
use sonarpost::infrastructure::slack::SlackWebhookPublisher;
use sonarpost::infrastructure::sonarqube::SonarQubeClient;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("sonarpost {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!(
        "Configuration loaded: server={}, projects={:?}",
        config.sonarqube_url, config.project_ids
    );

    let service = SonarQubeClient::new(
        config.sonarqube_url.clone(),
        config.sonarqube_token.clone(),
    );
    let publisher = SlackWebhookPublisher::new(config.slack_webhook_url.clone());

    report::run(&config, &service, &publisher).await
}
