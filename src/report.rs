//! Probe results and the status report handed to the display layer
//!
//! ## Wire Format
//!
//! ```json
//! { "items": [ { "id": "crm", "name": "CRM", "url": "http://crm/health",
//!                "ok": true, "status_code": 200, "latency_ms": 12,
//!                "checked_at": "2025-01-01T00:00:00Z" } ] }
//! ```
//!
//! Failed items carry an additional `error` object describing the failure class.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::ConnectorDescriptor;

/// Why a probe did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeFailure {
    /// No response within the deadline
    Timeout { timeout_ms: u64 },

    /// Connection could not be established or was reset (DNS, refused, TLS, ...)
    Network { message: String },

    /// A response arrived with a status outside 200-399
    Protocol { status_code: u16 },

    /// The probe task died before producing a result
    Aborted,
}

impl ProbeFailure {
    /// Status code received from the connector, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProbeFailure::Protocol { status_code } => Some(*status_code),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeFailure::Timeout { timeout_ms } => write!(f, "timed out after {timeout_ms}ms"),
            ProbeFailure::Network { message } => write!(f, "network failure: {message}"),
            ProbeFailure::Protocol { status_code } => {
                write!(f, "unexpected status code: {status_code}")
            }
            ProbeFailure::Aborted => write!(f, "probe aborted"),
        }
    }
}

/// Outcome of one probe against one connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub id: String,
    pub name: String,

    /// The URL that was actually requested
    pub url: String,

    pub ok: bool,

    /// Received HTTP status. Also kept for failing responses.
    pub status_code: Option<u16>,

    /// Time from request start to response, only for successful probes
    pub latency_ms: Option<u64>,

    /// When the probe attempt concluded
    pub checked_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProbeFailure>,
}

impl ProbeResult {
    /// A probe that received a 2xx/3xx response in time
    pub fn healthy(
        descriptor: &ConnectorDescriptor,
        url: impl Into<String>,
        status_code: u16,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            url: url.into(),
            ok: true,
            status_code: Some(status_code),
            latency_ms: Some(latency_ms),
            checked_at: Utc::now(),
            error: None,
        }
    }

    /// A probe that failed; latency is never reported for failures
    pub fn unhealthy(
        descriptor: &ConnectorDescriptor,
        url: impl Into<String>,
        failure: ProbeFailure,
    ) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            url: url.into(),
            ok: false,
            status_code: failure.status_code(),
            latency_ms: None,
            checked_at: Utc::now(),
            error: Some(failure),
        }
    }
}

/// Counts over one report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub healthy: usize,
    pub unhealthy: usize,
}

/// Result of one aggregation cycle, in registry order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    items: Vec<ProbeResult>,
}

impl StatusReport {
    pub fn new(items: Vec<ProbeResult>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ProbeResult] {
        &self.items
    }

    /// Items list for transport to the display layer
    pub fn to_wire(&self) -> &[ProbeResult] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ProbeResult> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let healthy = self.items.iter().filter(|item| item.ok).count();
        ReportSummary {
            total: self.items.len(),
            healthy,
            unhealthy: self.items.len() - healthy,
        }
    }
}
