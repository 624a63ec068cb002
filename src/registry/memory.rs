//! In-memory connector registry
//!
//! Holds a fixed, ordered list of connectors. Used for inline configuration
//! and for synthetic registries in tests.

use async_trait::async_trait;

use super::error::RegistryResult;
use super::{ConnectorDescriptor, ConnectorRegistry, ensure_unique_ids};

/// Registry backed by a list supplied at construction
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    connectors: Vec<ConnectorDescriptor>,
}

impl StaticRegistry {
    /// Create a registry, rejecting duplicate ids
    pub fn new(connectors: Vec<ConnectorDescriptor>) -> RegistryResult<Self> {
        ensure_unique_ids(&connectors)?;
        Ok(Self { connectors })
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

#[async_trait]
impl ConnectorRegistry for StaticRegistry {
    async fn list(&self) -> RegistryResult<Vec<ConnectorDescriptor>> {
        Ok(self.connectors.clone())
    }
}
