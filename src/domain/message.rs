use crate::domain::metrics::ProjectReport;
use chrono::NaiveDate;
use serde::Serialize;

/// One display block of the rendered report, serialized in the Block Kit
/// shape the webhook expects (`{"type": "section", ...}` /
/// `{"type": "divider"}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Section { text: Mrkdwn },
    Divider,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mrkdwn {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl Block {
    fn section(text: String) -> Self {
        Block::Section {
            text: Mrkdwn {
                kind: "mrkdwn",
                text,
            },
        }
    }

    /// Text of a section block, `None` for dividers.
    pub fn section_text(&self) -> Option<&str> {
        match self {
            Block::Section { text } => Some(&text.text),
            Block::Divider => None,
        }
    }
}

/// The rendered report: one intro block, then a title block, a metrics
/// block and a divider per project, in configured project order.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMessage {
    pub text: String,
    pub blocks: Vec<Block>,
}

impl ReportMessage {
    /// Pure transformation from the collected reports into the block
    /// sequence. `generated_on` is stamped into the intro block.
    pub fn render(reports: &[ProjectReport], server_url: &str, generated_on: NaiveDate) -> Self {
        let server_url = server_url.trim_end_matches('/');
        let mut blocks = Vec::with_capacity(1 + reports.len() * 3);

        blocks.push(Block::section(format!(
            ":sonarcloud: SonarQube Report - {} :sonarcloud:",
            generated_on.format("%m-%d-%Y")
        )));

        for report in reports {
            let dashboard_url = format!("{}/dashboard?id={}", server_url, report.project_id);
            blocks.push(Block::section(format!(
                "*<{}|{}>*",
                dashboard_url, report.project_id
            )));

            let metrics = &report.metrics;
            let mut text = format!(
                "Coverage: {}\nBugs: {}\nVulnerabilities: {}\nCode Smells: {}\n",
                metrics.coverage, metrics.bugs, metrics.vulnerabilities, metrics.code_smells
            );
            if let Some(gate) = &metrics.quality_gate {
                if gate.passed() {
                    text.push_str(":check_green: Passed\n");
                } else {
                    text.push_str(":x: Failed\n");
                }
            }
            blocks.push(Block::section(text));

            blocks.push(Block::Divider);
        }

        Self {
            text: "SonarQube project metrics report".to_string(),
            blocks,
        }
    }
}
