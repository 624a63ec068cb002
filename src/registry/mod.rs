//! Connector registries
//!
//! A registry supplies the ordered list of connectors probed during one
//! aggregation cycle. The aggregator never caches this list: every cycle
//! calls [`ConnectorRegistry::list`] exactly once and works on that snapshot.
//!
//! ## Registries
//!
//! - **Static**: an in-memory list injected at startup (inline config, tests)
//! - **File**: a JSON or TOML catalog re-read on every cycle
//!
//! ## Usage
//!
//! ```no_run
//! use connector_health::registry::{ConnectorRegistry, FileRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = FileRegistry::new("./connectors.toml");
//!     let connectors = registry.list().await?;
//!     println!("{} connectors registered", connectors.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod file;
pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{RegistryError, RegistryResult};
pub use file::FileRegistry;
pub use memory::StaticRegistry;

/// A named remote endpoint exposing a `/health` check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    /// Unique identifier within one registry
    pub id: String,

    /// Human readable name shown by the display layer
    pub name: String,

    /// Base URL of the connector; `/health` is appended when probing
    pub base_url: String,
}

impl ConnectorDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_url: base_url.into(),
        }
    }
}

/// On-disk catalog layout shared by file and inline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub connectors: Vec<ConnectorDescriptor>,
}

/// Source of the connectors to probe
///
/// Implementations must be `Send + Sync` as one registry is shared by
/// every request of the API server.
///
/// ## Error Handling
///
/// A failing `list` aborts the whole aggregation cycle. Implementations
/// should only fail when the list itself cannot be produced; problems with
/// individual connectors belong in the report, not here.
#[async_trait]
pub trait ConnectorRegistry: Send + Sync {
    /// Return the ordered connector list for one cycle
    async fn list(&self) -> RegistryResult<Vec<ConnectorDescriptor>>;
}

/// Reject descriptor lists that reuse an id
pub fn ensure_unique_ids(connectors: &[ConnectorDescriptor]) -> RegistryResult<()> {
    let mut seen = HashSet::with_capacity(connectors.len());
    for connector in connectors {
        if !seen.insert(connector.id.as_str()) {
            return Err(RegistryError::DuplicateId(connector.id.clone()));
        }
    }
    Ok(())
}
