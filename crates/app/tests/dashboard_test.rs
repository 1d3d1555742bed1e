//! Integration tests for resolving dashboards loaded from definition files.
//!
//! These tests verify the complete flow of loading a definition, building
//! the dashboard and resolving its query variables.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use dashvar_application::{VariableError, VariableGetOptionsArgs, VariableValueProvider};
use dashvar_domain::{VariableRefresh, VariableValueOption};
use dashvar_infrastructure::{Dashboard, SystemClock, load_definition};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const DASHBOARD: &str = r#"
datasources:
  - kind: values
    uid: inventory
    values:
      - text: prod-web-1
      - text: prod-web-2
      - text: staging-web-1
  - kind: frames
    uid: regions
    frames:
      - fields:
          - name: text
            values: [eu-west, us-east, eu-west]
  - kind: frames
    uid: counts
    frames:
      - fields:
          - name: count
            values: [10, 9, 100]
variables:
  - name: region
    query: regions
    datasource: { uid: regions }
    sort: 1
  - name: env
    query: "*"
    datasource: { uid: inventory }
    regex: "/^(\\w+)-/"
  - name: host
    query: "web"
    datasource: { uid: inventory }
    regex: "^${env}-(.*)$"
    refresh: onTimeRangeChanged
  - name: count
    query: counts
    datasource: { uid: counts }
    sort: numericalDesc
  - name: nothing
    query: ""
    datasource: { uid: inventory }
"#;

async fn dashboard_from(content: &str, file_name: &str) -> Dashboard {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join(file_name);
    tokio::fs::write(&path, content)
        .await
        .expect("Failed to write definition");

    let definition = load_definition(&path).await.expect("Failed to load definition");
    Dashboard::build(definition, Arc::new(SystemClock::new())).expect("Failed to build dashboard")
}

fn values(options: &[VariableValueOption]) -> Vec<&str> {
    options.iter().map(|o| o.value.as_str()).collect()
}

#[tokio::test]
async fn test_resolve_all_variables() {
    let dashboard = dashboard_from(DASHBOARD, "dashboard.yaml").await;

    let results = dashboard.resolve_all().await;
    for (name, result) in &results {
        assert!(result.is_ok(), "variable {name} failed: {result:?}");
    }

    let region = dashboard.variable("region").unwrap().state();
    assert_eq!(values(&region.options), vec!["eu-west", "eu-west", "us-east"]);
    assert_eq!(region.value, "eu-west");

    let env = dashboard.variable("env").unwrap().state();
    assert_eq!(values(&env.options), vec!["prod", "prod", "staging"]);

    let host = dashboard.variable("host").unwrap().state();
    assert_eq!(values(&host.options), vec!["web-1", "web-2"]);
    assert_eq!(host.refresh, VariableRefresh::OnTimeRangeChanged);

    let count = dashboard.variable("count").unwrap().state();
    assert_eq!(values(&count.options), vec!["100", "10", "9"]);

    let nothing = dashboard.variable("nothing").unwrap().state();
    assert!(nothing.options.is_empty());
    assert_eq!(nothing.value, "");
}

#[tokio::test]
async fn test_json_definition() {
    let yaml = dashboard_from(DASHBOARD, "dashboard.yaml").await;
    let states: Vec<_> = yaml.variables().iter().map(|v| v.state()).collect();
    let json = serde_json::json!({ "variables": states }).to_string();

    let dashboard = dashboard_from(&json, "dashboard.json").await;
    assert_eq!(dashboard.variables().len(), 5);
}

#[tokio::test]
async fn test_search_filter_through_provider() {
    let dashboard = dashboard_from(DASHBOARD, "dashboard.yaml").await;
    let host: &dyn VariableValueProvider = &**dashboard.variable("host").unwrap();

    dashboard.resolve_all().await;
    let options = host
        .get_value_options(&VariableGetOptionsArgs::with_search_filter("2"))
        .await
        .unwrap();

    assert_eq!(values(&options), vec!["web-2"]);
}

#[tokio::test]
async fn test_unknown_datasource_reported() {
    let definition = r"
variables:
  - name: host
    query: '*'
    datasource: { uid: missing }
";
    let dashboard = dashboard_from(definition, "dashboard.yml").await;

    let results = dashboard.resolve_all().await;
    assert!(matches!(results[0].1, Err(VariableError::DataSource(_))));
    assert!(dashboard.variable("host").unwrap().options().is_empty());
}

#[tokio::test]
async fn test_time_range_change_reresolves_active_variables() {
    let dashboard = dashboard_from(DASHBOARD, "dashboard.yaml").await;
    let host = Arc::clone(dashboard.variable("host").unwrap());
    let mut changes = host.subscribe_to_state();

    dashboard.activate();
    tokio::time::timeout(Duration::from_secs(2), changes.changed())
        .await
        .expect("initial resolution timed out")
        .unwrap();
    changes.mark_unchanged();

    dashboard
        .time_range()
        .set_last(ChronoDuration::minutes(5), chrono::Utc::now());
    tokio::time::timeout(Duration::from_secs(2), changes.changed())
        .await
        .expect("time range resolution timed out")
        .unwrap();

    dashboard.deactivate();
    assert!(!host.is_active());
}
