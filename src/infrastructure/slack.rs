use crate::domain::errors::PublishError;
use crate::domain::message::ReportMessage;
use crate::domain::ports::ReportPublisher;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Delivers the rendered report to a Slack incoming webhook. The webhook
/// URL itself is the only credential.
pub struct SlackWebhookPublisher {
    client: Client,
    webhook_url: String,
}

impl SlackWebhookPublisher {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl ReportPublisher for SlackWebhookPublisher {
    async fn publish(&self, message: &ReportMessage) -> Result<(), PublishError> {
        debug!("Posting report with {} blocks to webhook", message.blocks.len());

        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PublishError::Status {
                status: response.status(),
            });
        }

        Ok(())
    }
}
