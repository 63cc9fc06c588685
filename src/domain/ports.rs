use crate::domain::errors::{FetchError, PublishError};
use crate::domain::message::ReportMessage;
use crate::domain::metrics::{Coverage, ProjectMetrics, QualityGate};
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait QualityMetricsService: Send + Sync {
    /// Fetch the measure set for one project. The gate verdict is left
    /// unset; `get_quality_gate_status` is authoritative for it.
    async fn get_project_metrics(&self, project_id: &str) -> Result<ProjectMetrics, FetchError>;

    /// Fetch coverage alone. `NotApplicable` when the server has no
    /// coverage measure for the project.
    async fn get_coverage(&self, project_id: &str) -> Result<Coverage, FetchError>;

    async fn get_quality_gate_status(&self, project_id: &str) -> Result<QualityGate, FetchError>;
}

#[async_trait]
pub trait ReportPublisher: Send + Sync {
    async fn publish(&self, message: &ReportMessage) -> Result<(), PublishError>;
}
