//! Failure tests for aggregation cycles
//!
//! These tests verify that the system handles failures gracefully:
//! - Unreachable connectors degrade into report items
//! - Timeouts bound the cycle duration
//! - Only registry failures fail a cycle

use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use async_trait::async_trait;
use connector_health::registry::{
    ConnectorDescriptor, ConnectorRegistry, FileRegistry, RegistryError, RegistryResult,
};
use connector_health::report::ProbeFailure;

use crate::helpers::*;

struct OfflineCatalog;

#[async_trait]
impl ConnectorRegistry for OfflineCatalog {
    async fn list(&self) -> RegistryResult<Vec<ConnectorDescriptor>> {
        Err(RegistryError::Unavailable("catalog service offline".to_string()))
    }
}

#[tokio::test]
async fn test_all_unreachable_is_not_an_error() {
    let registry = create_registry(
        (0..3)
            .map(|i| create_descriptor(&format!("gone-{i}"), unreachable_base_url()))
            .collect(),
    );
    let aggregator = create_http_aggregator(1000, 2);

    let report = aggregator.run_configured(&registry).await.unwrap();

    assert_eq!(report.len(), 3);
    assert!(report.items().iter().all(|item| !item.ok));
}

#[tokio::test]
async fn test_never_responding_connector_bounded_by_timeout() {
    let hanging = start_connector(200, Some(Duration::from_secs(30))).await;
    let registry = create_registry(vec![create_descriptor("hanging", hanging.uri())]);
    let aggregator = create_http_aggregator(300, 4);

    let started = Instant::now();
    let report = aggregator.run_configured(&registry).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(1300), "cycle took {elapsed:?}");

    let item = &report.items()[0];
    assert!(!item.ok);
    assert_eq!(item.status_code, None);
    assert_eq!(item.latency_ms, None);
    assert_matches!(item.error, Some(ProbeFailure::Timeout { .. }));
}

#[tokio::test]
async fn test_worst_case_is_waves_of_timeouts() {
    let hanging = start_connector(200, Some(Duration::from_secs(30))).await;
    let registry = create_registry(
        (0..4)
            .map(|i| create_descriptor(&format!("hanging-{i}"), hanging.uri()))
            .collect(),
    );
    // ceil(4 / 2) waves of 250ms each
    let aggregator = create_http_aggregator(250, 2);

    let started = Instant::now();
    let report = aggregator.run_configured(&registry).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.len(), 4);
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(1500), "cycle took {elapsed:?}");
}

#[tokio::test]
async fn test_slow_connector_does_not_delay_others_results() {
    let hanging = start_connector(200, Some(Duration::from_secs(30))).await;
    let healthy = start_connector(200, None).await;

    let registry = create_registry(vec![
        create_descriptor("hanging", hanging.uri()),
        create_descriptor("healthy", healthy.uri()),
    ]);
    let aggregator = create_http_aggregator(400, 2);

    let report = aggregator.run_configured(&registry).await.unwrap();

    assert!(!report.items()[0].ok);
    assert!(report.items()[1].ok);
    assert!(report.items()[1].latency_ms.unwrap() < 400);
}

#[tokio::test]
async fn test_registry_unavailable_fails_cycle() {
    let aggregator = create_http_aggregator(1000, 2);

    let result = aggregator.run_configured(&OfflineCatalog).await;

    assert_matches!(result, Err(RegistryError::Unavailable(msg)) if msg.contains("offline"));
}

#[tokio::test]
async fn test_missing_catalog_file_fails_cycle() {
    let aggregator = create_http_aggregator(1000, 2);
    let registry = FileRegistry::new("/nonexistent/catalog.toml");

    assert_matches!(
        aggregator.run_configured(&registry).await,
        Err(RegistryError::Unavailable(_))
    );
}
