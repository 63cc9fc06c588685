//! End-to-end tests driving the real HTTP stack against mocked
//! SonarQube and webhook servers.

use serde_json::{Value, json};
use sonarpost::application::report;
use sonarpost::config::Config;
use sonarpost::domain::errors::{FetchError, PublishError};
use sonarpost::domain::metrics::Coverage;
use sonarpost::domain::ports::QualityMetricsService;
use sonarpost::infrastructure::slack::SlackWebhookPublisher;
use sonarpost::infrastructure::sonarqube::SonarQubeClient;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const METRIC_KEYS: &str = "bugs,vulnerabilities,code_smells,coverage";
const TOKEN: &str = "squ_test";

fn measures_body(pairs: &[(&str, &str)]) -> Value {
    let measures: Vec<Value> = pairs
        .iter()
        .map(|(metric, value)| json!({"metric": metric, "value": value}))
        .collect();
    json!({"component": {"measures": measures}})
}

fn gate_body(status: &str) -> Value {
    json!({"projectStatus": {"status": status}})
}

/// Mount the three happy-path endpoints for one project.
async fn mount_project(server: &MockServer, project_id: &str, coverage: &str, gate: &str) {
    Mock::given(method("GET"))
        .and(path("/api/measures/component"))
        .and(query_param("component", project_id))
        .and(query_param("metricKeys", METRIC_KEYS))
        .and(header("Authorization", "Bearer squ_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(measures_body(&[
            ("bugs", "2"),
            ("vulnerabilities", "0"),
            ("code_smells", "5"),
        ])))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/measures/component"))
        .and(query_param("component", project_id))
        .and(query_param("metricKeys", "coverage"))
        .and(header("Authorization", "Bearer squ_test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(measures_body(&[("coverage", coverage)])),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/qualitygates/project_status"))
        .and(query_param("projectKey", project_id))
        .and(header("Authorization", "Bearer squ_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_body(gate)))
        .expect(1)
        .mount(server)
        .await;
}

fn config_for(sonar: &MockServer, webhook: &MockServer, project_ids: &[&str]) -> Config {
    Config {
        sonarqube_url: sonar.uri(),
        sonarqube_token: TOKEN.to_string(),
        project_ids: project_ids.iter().map(|id| id.to_string()).collect(),
        slack_webhook_url: webhook.uri(),
    }
}

fn query(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.to_string())
}

#[tokio::test]
async fn test_end_to_end_two_projects_post_seven_blocks() {
    let sonar = MockServer::start().await;
    let webhook = MockServer::start().await;

    mount_project(&sonar, "alpha", "90.0", "OK").await;
    mount_project(&sonar, "beta", "42.3", "ERROR").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&webhook)
        .await;

    let config = config_for(&sonar, &webhook, &["alpha", "beta"]);
    let service = SonarQubeClient::new(config.sonarqube_url.clone(), config.sonarqube_token.clone());
    let publisher = SlackWebhookPublisher::new(config.slack_webhook_url.clone());

    report::run(&config, &service, &publisher).await.unwrap();

    // one webhook POST, 7 blocks in interleaved order
    let posts = webhook.received_requests().await.unwrap();
    assert_eq!(posts.len(), 1);

    let body: Value = serde_json::from_slice(&posts[0].body).unwrap();
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 7);

    let types: Vec<&str> = blocks
        .iter()
        .map(|block| block["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        [
            "section", // intro
            "section", "section", "divider", // alpha
            "section", "section", "divider", // beta
        ]
    );

    assert!(
        blocks[2]["text"]["text"]
            .as_str()
            .unwrap()
            .contains("Coverage: 90.0%")
    );
    assert!(
        blocks[5]["text"]["text"]
            .as_str()
            .unwrap()
            .contains(":x: Failed")
    );

    // 3N GETs, in configured order
    let fetches = sonar.received_requests().await.unwrap();
    let sequence: Vec<(String, String)> = fetches
        .iter()
        .map(|request| {
            if request.url.path() == "/api/qualitygates/project_status" {
                ("gate".to_string(), query(request, "projectKey").unwrap())
            } else if query(request, "metricKeys").as_deref() == Some("coverage") {
                ("coverage".to_string(), query(request, "component").unwrap())
            } else {
                ("measures".to_string(), query(request, "component").unwrap())
            }
        })
        .collect();

    let expected: Vec<(String, String)> = [
        ("measures", "alpha"),
        ("coverage", "alpha"),
        ("gate", "alpha"),
        ("measures", "beta"),
        ("coverage", "beta"),
        ("gate", "beta"),
    ]
    .iter()
    .map(|(op, id)| (op.to_string(), id.to_string()))
    .collect();
    assert_eq!(sequence, expected);
}

#[tokio::test]
async fn test_non_success_fetch_aborts_before_later_projects() {
    let sonar = MockServer::start().await;
    let webhook = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/measures/component"))
        .and(query_param("component", "alpha"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&sonar)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&webhook)
        .await;

    let config = config_for(&sonar, &webhook, &["alpha", "beta"]);
    let service = SonarQubeClient::new(config.sonarqube_url.clone(), config.sonarqube_token.clone());
    let publisher = SlackWebhookPublisher::new(config.slack_webhook_url.clone());

    let err = report::run(&config, &service, &publisher).await.unwrap_err();

    match err.downcast_ref::<FetchError>() {
        Some(FetchError::Status { project_id, status }) => {
            assert_eq!(project_id, "alpha");
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("expected fetch status error, got {other:?}"),
    }

    // the failing project was the only one touched
    let fetches = sonar.received_requests().await.unwrap();
    assert_eq!(fetches.len(), 1);
}

#[tokio::test]
async fn test_webhook_rejection_is_publish_error_without_retry() {
    let sonar = MockServer::start().await;
    let webhook = MockServer::start().await;

    mount_project(&sonar, "alpha", "90.0", "OK").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&webhook)
        .await;

    let config = config_for(&sonar, &webhook, &["alpha"]);
    let service = SonarQubeClient::new(config.sonarqube_url.clone(), config.sonarqube_token.clone());
    let publisher = SlackWebhookPublisher::new(config.slack_webhook_url.clone());

    let err = report::run(&config, &service, &publisher).await.unwrap_err();

    match err.downcast_ref::<PublishError>() {
        Some(PublishError::Status { status }) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected publish status error, got {other:?}"),
    }

    assert_eq!(webhook.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_coverage_not_applicable_when_no_measures() {
    let sonar = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/measures/component"))
        .and(query_param("component", "infra-repo"))
        .and(query_param("metricKeys", "coverage"))
        .and(header("Authorization", "Bearer squ_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(measures_body(&[])))
        .mount(&sonar)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/measures/component"))
        .and(query_param("component", "covered-repo"))
        .and(query_param("metricKeys", "coverage"))
        .and(header("Authorization", "Bearer squ_test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(measures_body(&[("coverage", "87.5")])),
        )
        .mount(&sonar)
        .await;

    let service = SonarQubeClient::new(sonar.uri(), TOKEN.to_string());

    assert_eq!(
        service.get_coverage("infra-repo").await.unwrap(),
        Coverage::NotApplicable
    );
    assert_eq!(
        service.get_coverage("covered-repo").await.unwrap(),
        Coverage::Percent(87.5)
    );
}
