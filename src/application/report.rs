use crate::config::Config;
use crate::domain::errors::FetchError;
use crate::domain::message::ReportMessage;
use crate::domain::metrics::ProjectReport;
use crate::domain::ports::{QualityMetricsService, ReportPublisher};
use anyhow::Result;
use chrono::Local;
use tracing::info;

/// Fetch the metric set for every configured project, in configured
/// order. Each project needs three calls: the measure batch, coverage on
/// its own (the server drops the coverage measure entirely for projects
/// without tests), and the gate verdict. The first failure aborts the
/// whole collection.
pub async fn collect_project_reports(
    service: &dyn QualityMetricsService,
    project_ids: &[String],
) -> Result<Vec<ProjectReport>, FetchError> {
    let mut reports = Vec::with_capacity(project_ids.len());

    for project_id in project_ids {
        let mut metrics = service.get_project_metrics(project_id).await?;
        metrics.coverage = service.get_coverage(project_id).await?;
        metrics.quality_gate = Some(service.get_quality_gate_status(project_id).await?);

        info!(
            "Collected metrics for {}: bugs={}, vulnerabilities={}, code_smells={}, coverage={}",
            project_id, metrics.bugs, metrics.vulnerabilities, metrics.code_smells, metrics.coverage
        );

        reports.push(ProjectReport {
            project_id: project_id.clone(),
            metrics,
        });
    }

    Ok(reports)
}

/// One full reporting run: collect, render, publish.
pub async fn run(
    config: &Config,
    service: &dyn QualityMetricsService,
    publisher: &dyn ReportPublisher,
) -> Result<()> {
    let reports = collect_project_reports(service, &config.project_ids).await?;

    let message = ReportMessage::render(&reports, &config.sonarqube_url, Local::now().date_naive());
    publisher.publish(&message).await?;

    info!("Report for {} projects delivered to webhook", reports.len());
    Ok(())
}
