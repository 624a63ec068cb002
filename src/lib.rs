//! Connector health aggregation
//!
//! Probes every connector of a [`registry::ConnectorRegistry`] with a
//! bounded-time `GET /health`, fans the probes out over a bounded worker pool
//! and returns a [`report::StatusReport`] in registry order.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use connector_health::{
//!     aggregator::Aggregator,
//!     config::ProbeSettings,
//!     probe::HttpProbe,
//!     registry::{ConnectorDescriptor, StaticRegistry},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = StaticRegistry::new(vec![ConnectorDescriptor::new(
//!         "crm",
//!         "CRM",
//!         "https://crm.internal/",
//!     )])?;
//!     let aggregator = Aggregator::new(Arc::new(HttpProbe::new()?), ProbeSettings::default());
//!
//!     let report = aggregator.run_configured(&registry).await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod config;
pub mod probe;
pub mod registry;
pub mod report;
pub mod util;

pub use aggregator::Aggregator;
pub use probe::{HealthProbe, HttpProbe};
pub use registry::{ConnectorDescriptor, ConnectorRegistry, RegistryError};
pub use report::{ProbeFailure, ProbeResult, StatusReport};
