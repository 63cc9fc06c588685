use crate::domain::errors::FetchError;
use crate::domain::metrics::{Coverage, ProjectMetrics, QualityGate};
use crate::domain::ports::QualityMetricsService;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Measure keys requested from the server. The recognized set is closed;
/// anything else a response carries is ignored.
const METRIC_KEYS: &str = "bugs,vulnerabilities,code_smells,coverage";

pub struct SonarQubeClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SonarQubeClient {
    pub fn new(base_url: String, token: String) -> Self {
        // Configure client with connection pool limits
        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get_measures(
        &self,
        project_id: &str,
        metric_keys: &str,
    ) -> Result<Vec<Measure>, FetchError> {
        let url = format!("{}/api/measures/component", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("component", project_id), ("metricKeys", metric_keys)])
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                project_id: project_id.to_string(),
                status: response.status(),
            });
        }

        let body: ComponentResponse = response.json().await?;
        Ok(body.component.measures)
    }
}

#[async_trait]
impl QualityMetricsService for SonarQubeClient {
    async fn get_project_metrics(&self, project_id: &str) -> Result<ProjectMetrics, FetchError> {
        let measures = self.get_measures(project_id, METRIC_KEYS).await?;
        debug!("Fetched {} measures for {}", measures.len(), project_id);
        metrics_from_measures(project_id, &measures)
    }

    async fn get_coverage(&self, project_id: &str) -> Result<Coverage, FetchError> {
        let measures = self.get_measures(project_id, "coverage").await?;

        match measures.first() {
            None => Ok(Coverage::NotApplicable),
            Some(measure) => {
                let value = measure.value.as_deref().unwrap_or_default();
                Ok(Coverage::Percent(parse_percent(project_id, value)?))
            }
        }
    }

    async fn get_quality_gate_status(&self, project_id: &str) -> Result<QualityGate, FetchError> {
        let url = format!("{}/api/qualitygates/project_status", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("projectKey", project_id)])
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                project_id: project_id.to_string(),
                status: response.status(),
            });
        }

        let body: QualityGateResponse = response.json().await?;
        debug!(
            "Quality gate for {}: {}",
            project_id, body.project_status.status
        );
        Ok(QualityGate::from_status(&body.project_status.status))
    }
}

/// Fold a measure list into the fixed metric set. Counters the server
/// omitted stay at zero; the gate verdict is not part of this endpoint.
fn metrics_from_measures(
    project_id: &str,
    measures: &[Measure],
) -> Result<ProjectMetrics, FetchError> {
    let mut metrics = ProjectMetrics::default();

    for measure in measures {
        let Some(value) = measure.value.as_deref() else {
            continue;
        };

        match measure.metric.as_str() {
            "bugs" => metrics.bugs = parse_count(project_id, "bugs", value)?,
            "vulnerabilities" => {
                metrics.vulnerabilities = parse_count(project_id, "vulnerabilities", value)?;
            }
            "code_smells" => metrics.code_smells = parse_count(project_id, "code_smells", value)?,
            "coverage" => metrics.coverage = Coverage::Percent(parse_percent(project_id, value)?),
            _ => {}
        }
    }

    Ok(metrics)
}

fn parse_count(project_id: &str, metric: &str, value: &str) -> Result<u64, FetchError> {
    value.parse::<u64>().map_err(|_| FetchError::Decode {
        project_id: project_id.to_string(),
        reason: format!("{metric} value {value:?} is not a count"),
    })
}

fn parse_percent(project_id: &str, value: &str) -> Result<f64, FetchError> {
    value.parse::<f64>().map_err(|_| FetchError::Decode {
        project_id: project_id.to_string(),
        reason: format!("coverage value {value:?} is not a number"),
    })
}

// ===== Response models =====

#[derive(Debug, Deserialize)]
struct ComponentResponse {
    component: ComponentBody,
}

#[derive(Debug, Deserialize)]
struct ComponentBody {
    #[serde(default)]
    measures: Vec<Measure>,
}

#[derive(Debug, Deserialize)]
struct Measure {
    metric: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QualityGateResponse {
    #[serde(rename = "projectStatus")]
    project_status: ProjectStatus,
}

#[derive(Debug, Deserialize)]
struct ProjectStatus {
    status: String,
}
