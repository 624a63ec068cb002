//! File-backed connector registry
//!
//! Reads a catalog file on every call to `list`, so edits to the catalog
//! show up in the next aggregation cycle without a restart.
//!
//! ## Format
//!
//! ```toml
//! [[connectors]]
//! id = "billing"
//! name = "Billing API"
//! base_url = "https://billing.internal/"
//! ```
//!
//! JSON catalogs use the same shape (`{"connectors": [...]}`). The format is
//! chosen by file extension; anything other than `.toml` is read as JSON.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, trace};

use super::error::{RegistryError, RegistryResult};
use super::{Catalog, ConnectorDescriptor, ConnectorRegistry, ensure_unique_ids};

/// Registry that loads connectors from a JSON or TOML catalog
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> RegistryResult<Catalog> {
        let is_toml = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let catalog = if is_toml {
            toml::from_str(content)?
        } else {
            serde_json::from_str(content)?
        };
        Ok(catalog)
    }
}

#[async_trait]
impl ConnectorRegistry for FileRegistry {
    async fn list(&self) -> RegistryResult<Vec<ConnectorDescriptor>> {
        trace!("reading connector catalog from {}", self.path.display());

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RegistryError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let catalog = self.parse(&content)?;
        ensure_unique_ids(&catalog.connectors)?;

        debug!(
            "loaded {} connectors from {}",
            catalog.connectors.len(),
            self.path.display()
        );
        Ok(catalog.connectors)
    }
}
