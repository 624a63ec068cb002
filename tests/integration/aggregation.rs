//! Integration tests for full aggregation cycles over HTTP
//!
//! These tests verify that:
//! - Reports contain one item per registered connector
//! - Report order follows the registry, not completion order
//! - File catalogs are picked up on every cycle

use std::io::Write;
use std::time::Duration;

use connector_health::registry::{ConnectorRegistry, FileRegistry};
use pretty_assertions::assert_eq;

use crate::helpers::*;

#[tokio::test]
async fn test_empty_registry_yields_empty_items() {
    let aggregator = create_http_aggregator(1000, 4);

    let report = aggregator
        .run_configured(&create_registry(vec![]))
        .await
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        serde_json::json!({ "items": [] })
    );
}

#[tokio::test]
async fn test_slowest_first_keeps_registry_order() {
    let slow = start_connector(200, Some(Duration::from_millis(400))).await;
    let medium = start_connector(200, Some(Duration::from_millis(150))).await;
    let fast = start_connector(200, None).await;

    let registry = create_registry(vec![
        create_descriptor("slow", slow.uri()),
        create_descriptor("medium", medium.uri()),
        create_descriptor("fast", fast.uri()),
    ]);
    let aggregator = create_http_aggregator(2000, 3);

    let report = aggregator.run_configured(&registry).await.unwrap();

    let ids: Vec<_> = report.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["slow", "medium", "fast"]);
    assert!(report.items().iter().all(|item| item.ok));

    // the slow connector really was slower, so completion order differed
    let slow_latency = report.items()[0].latency_ms.unwrap();
    let fast_latency = report.items()[2].latency_ms.unwrap();
    assert!(slow_latency > fast_latency);
}

#[tokio::test]
async fn test_item_count_matches_registry_with_mixed_outcomes() {
    let healthy = start_connector(200, None).await;
    let broken = start_connector(500, None).await;
    let hanging = start_connector(200, Some(Duration::from_secs(5))).await;

    let registry = create_registry(vec![
        create_descriptor("healthy", healthy.uri()),
        create_descriptor("broken", broken.uri()),
        create_descriptor("gone", unreachable_base_url()),
        create_descriptor("hanging", hanging.uri()),
    ]);
    let aggregator = create_http_aggregator(300, 4);

    let report = aggregator.run_configured(&registry).await.unwrap();
    let expected_len = registry.list().await.unwrap().len();

    assert_eq!(report.len(), expected_len);

    let outcomes: Vec<_> = report
        .items()
        .iter()
        .map(|item| (item.id.as_str(), item.ok, item.status_code))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("healthy", true, Some(200)),
            ("broken", false, Some(500)),
            ("gone", false, None),
            ("hanging", false, None),
        ]
    );
    assert_eq!(report.summary().unhealthy, 3);
}

#[tokio::test]
async fn test_wire_items_shape() {
    let healthy = start_connector(200, None).await;
    let registry = create_registry(vec![
        create_descriptor("healthy", healthy.uri()),
        create_descriptor("gone", unreachable_base_url()),
    ]);
    let aggregator = create_http_aggregator(1000, 2);

    let report = aggregator.run_configured(&registry).await.unwrap();
    let wire = serde_json::to_value(report.to_wire()).unwrap();

    let up = &wire[0];
    assert_eq!(up["id"], "healthy");
    assert_eq!(up["ok"], true);
    assert_eq!(up["status_code"], 200);
    assert!(up["latency_ms"].is_u64());
    assert!(up["checked_at"].is_string());
    assert!(up.get("error").is_none());

    let down = &wire[1];
    assert_eq!(down["ok"], false);
    assert!(down["status_code"].is_null());
    assert!(down["latency_ms"].is_null());
    assert_eq!(down["error"]["kind"], "network");
}

#[tokio::test]
async fn test_file_registry_cycle() {
    let connector = start_connector(200, None).await;

    let mut catalog = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        catalog,
        r#"{{"connectors": [{{"id": "crm", "name": "CRM", "base_url": "{}/"}}]}}"#,
        connector.uri()
    )
    .unwrap();

    let registry = FileRegistry::new(catalog.path());
    let aggregator = create_http_aggregator(1000, 2);

    let report = aggregator.run_configured(&registry).await.unwrap();

    assert_eq!(report.len(), 1);
    assert!(report.items()[0].ok);
    assert_eq!(report.items()[0].name, "CRM");

    // catalog edits show up in the next cycle
    std::fs::write(catalog.path(), r#"{"connectors": []}"#).unwrap();
    let report = aggregator.run_configured(&registry).await.unwrap();
    assert!(report.is_empty());
}
