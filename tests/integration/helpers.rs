//! Helper functions for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use connector_health::{
    aggregator::Aggregator,
    config::ProbeSettings,
    probe::HttpProbe,
    registry::{ConnectorDescriptor, StaticRegistry},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn create_descriptor(id: &str, base_url: impl Into<String>) -> ConnectorDescriptor {
    ConnectorDescriptor::new(id, format!("Connector {id}"), base_url)
}

pub fn create_registry(connectors: Vec<ConnectorDescriptor>) -> StaticRegistry {
    StaticRegistry::new(connectors).unwrap()
}

pub fn create_http_aggregator(timeout_ms: u64, max_concurrency: usize) -> Aggregator {
    Aggregator::new(
        Arc::new(HttpProbe::new().unwrap()),
        ProbeSettings {
            per_probe_timeout_ms: timeout_ms,
            max_concurrency,
        },
    )
}

/// Mock connector answering `GET /health` with `status` after `delay`
pub async fn start_connector(status: u16, delay: Option<Duration>) -> MockServer {
    let mock_server = MockServer::start().await;

    let mut response = ResponseTemplate::new(status).set_body_string("OK");
    if let Some(delay) = delay {
        response = response.set_delay(delay);
    }

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(response)
        .mount(&mock_server)
        .await;

    mock_server
}

/// Base URL of a local port nothing listens on
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
