use crate::domain::errors::{FetchError, PublishError};
use crate::domain::message::ReportMessage;
use crate::domain::metrics::{Coverage, ProjectMetrics, QualityGate};
use crate::domain::ports::{QualityMetricsService, ReportPublisher};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;

/// Scripted stand-in for the analysis server. Lives in `src/` so
/// integration tests can drive the real application layer against it.
/// Every call is recorded so tests can assert counts and ordering.
#[derive(Default)]
pub struct MockMetricsService {
    metrics: HashMap<String, ProjectMetrics>,
    coverage: HashMap<String, Coverage>,
    gates: HashMap<String, QualityGate>,
    failing: Option<(String, StatusCode)>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockMetricsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(
        mut self,
        project_id: &str,
        metrics: ProjectMetrics,
        coverage: Coverage,
        gate: QualityGate,
    ) -> Self {
        self.metrics.insert(project_id.to_string(), metrics);
        self.coverage.insert(project_id.to_string(), coverage);
        self.gates.insert(project_id.to_string(), gate);
        self
    }

    /// Make every call for `project_id` fail with the given status.
    pub fn failing_project(mut self, project_id: &str, status: StatusCode) -> Self {
        self.failing = Some((project_id.to_string(), status));
        self
    }

    /// Recorded `(operation, project_id)` pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    fn record(&self, operation: &str, project_id: &str) -> Result<(), FetchError> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push((operation.to_string(), project_id.to_string()));

        if let Some((failing_id, status)) = &self.failing {
            if failing_id == project_id {
                return Err(FetchError::Status {
                    project_id: project_id.to_string(),
                    status: *status,
                });
            }
        }
        Ok(())
    }

    fn missing(project_id: &str) -> FetchError {
        FetchError::Decode {
            project_id: project_id.to_string(),
            reason: "no scripted response".to_string(),
        }
    }
}

#[async_trait]
impl QualityMetricsService for MockMetricsService {
    async fn get_project_metrics(&self, project_id: &str) -> Result<ProjectMetrics, FetchError> {
        self.record("metrics", project_id)?;
        self.metrics
            .get(project_id)
            .cloned()
            .ok_or_else(|| Self::missing(project_id))
    }

    async fn get_coverage(&self, project_id: &str) -> Result<Coverage, FetchError> {
        self.record("coverage", project_id)?;
        self.coverage
            .get(project_id)
            .copied()
            .ok_or_else(|| Self::missing(project_id))
    }

    async fn get_quality_gate_status(&self, project_id: &str) -> Result<QualityGate, FetchError> {
        self.record("quality_gate", project_id)?;
        self.gates
            .get(project_id)
            .cloned()
            .ok_or_else(|| Self::missing(project_id))
    }
}

/// Records published messages instead of hitting a webhook; can be
/// scripted to reject with a given status.
#[derive(Default)]
pub struct MockPublisher {
    fail_status: Option<StatusCode>,
    sent: Mutex<Vec<ReportMessage>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            fail_status: Some(status),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<ReportMessage> {
        self.sent.lock().expect("sent log poisoned").clone()
    }
}

#[async_trait]
impl ReportPublisher for MockPublisher {
    async fn publish(&self, message: &ReportMessage) -> Result<(), PublishError> {
        if let Some(status) = self.fail_status {
            return Err(PublishError::Status { status });
        }

        self.sent
            .lock()
            .expect("sent log poisoned")
            .push(message.clone());
        Ok(())
    }
}
