//! Health probes - one bounded-time liveness check per connector
//!
//! A probe never fails: every outcome, including timeouts and refused
//! connections, is folded into the returned [`ProbeResult`].
//!
//! ## Wire Contract
//!
//! ```text
//! GET {base_url without trailing slashes}/health
//!     200-399 within the deadline  → ok
//!     anything else                → not ok
//! ```

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, instrument, trace, warn};

use crate::registry::ConnectorDescriptor;
use crate::report::{ProbeFailure, ProbeResult};

/// Deadline used when nothing else is configured
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(4000);

/// Performs a single liveness check against one connector
///
/// Implementations must honour `timeout` and release any network resources
/// they hold before returning. The aggregator enforces the same deadline
/// around every call, so an implementation that overruns is reported as a
/// timeout.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self, descriptor: &ConnectorDescriptor, timeout: Duration) -> ProbeResult;
}

/// URL probed for a connector
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url.trim_end_matches('/'))
}

/// Success and redirect statuses count as healthy
pub fn is_healthy_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

/// Probe issuing `GET /health` over HTTP(S)
///
/// The client is reused across probes and cycles so connections to the same
/// connector can be pooled.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            // a 3xx from /health is the observed status, not something to chase
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    #[instrument(skip_all, fields(connector = %descriptor.id))]
    async fn check(&self, descriptor: &ConnectorDescriptor, timeout: Duration) -> ProbeResult {
        let url = health_url(&descriptor.base_url);
        trace!("probing {url}");

        let start = Instant::now();

        // Dropping the send future on expiry cancels the request and closes its connection.
        let outcome = tokio::time::timeout(timeout, self.client.get(&url).send()).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(response)) => {
                let status_code = response.status().as_u16();
                // body is never read; dropping it releases the connection
                drop(response);

                if is_healthy_status(status_code) {
                    debug!("{url}: {status_code} in {latency_ms}ms");
                    ProbeResult::healthy(descriptor, url, status_code, latency_ms)
                } else {
                    warn!("{url}: unexpected status code {status_code}");
                    ProbeResult::unhealthy(descriptor, url, ProbeFailure::Protocol { status_code })
                }
            }
            Ok(Err(e)) => {
                let failure = classify_error(&e, timeout);
                warn!("{url}: {failure}");
                ProbeResult::unhealthy(descriptor, url, failure)
            }
            Err(_) => {
                let failure = ProbeFailure::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                };
                warn!("{url}: {failure}");
                ProbeResult::unhealthy(descriptor, url, failure)
            }
        }
    }
}

fn classify_error(err: &reqwest::Error, timeout: Duration) -> ProbeFailure {
    if err.is_timeout() {
        return ProbeFailure::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        };
    }

    ProbeFailure::Network {
        message: error_chain(err),
    }
}

/// reqwest's top-level message hides the interesting part in its sources
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
