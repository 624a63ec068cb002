//! Configuration loading
//!
//! A JSON or TOML file (picked by extension) supplies the registry source,
//! probe settings and API options. `CONNECTOR_HEALTH_*` environment
//! variables override individual values after loading.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, trace};

use crate::registry::{
    ConnectorDescriptor, ConnectorRegistry, FileRegistry, RegistryResult, StaticRegistry,
};
use crate::util;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 4000;

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// Where connectors come from (required to run a cycle)
    pub registry: Option<RegistryConfig>,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub api: ApiConfig,
}

/// Connector registry configuration
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RegistryConfig {
    /// Catalog file, re-read on every cycle
    File { path: PathBuf },

    /// Connectors listed directly in the config file
    Inline {
        #[serde(default)]
        connectors: Vec<ConnectorDescriptor>,
    },
}

impl RegistryConfig {
    pub fn build(&self) -> RegistryResult<Arc<dyn ConnectorRegistry>> {
        let registry: Arc<dyn ConnectorRegistry> = match self {
            RegistryConfig::File { path } => Arc::new(FileRegistry::new(path.clone())),
            RegistryConfig::Inline { connectors } => {
                Arc::new(StaticRegistry::new(connectors.clone())?)
            }
        };
        Ok(registry)
    }
}

/// Fan-out and deadline settings for aggregation cycles
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ProbeSettings {
    #[serde(default = "default_probe_timeout_ms")]
    pub per_probe_timeout_ms: u64,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl ProbeSettings {
    pub fn per_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.per_probe_timeout_ms)
    }

    /// Never less than one worker
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            per_probe_timeout_ms: default_probe_timeout_ms(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

/// API server configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Optional bearer token required on every request
    pub auth_token: Option<String>,

    /// Enable CORS for the display layer
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth_token: None,
            enable_cors: default_enable_cors(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_enable_cors() -> bool {
    true
}

impl Config {
    /// Load configuration from file, or use defaults if no file exists
    ///
    /// Without an explicit path the default location
    /// (`~/.config/connector-health/config.toml`) is tried.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = path.map(Path::to_path_buf).or_else(default_config_path);

        match config_path {
            Some(path) => read_config_file(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Build the configured registry
    pub fn build_registry(&self) -> anyhow::Result<Arc<dyn ConnectorRegistry>> {
        let registry = self
            .registry
            .as_ref()
            .context("No connector registry configured (set `registry` or pass a catalog)")?;
        Ok(registry.build()?)
    }

    /// Apply `CONNECTOR_HEALTH_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; unparseable values are ignored
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(timeout_ms) = util::parse_override(&lookup, util::TIMEOUT_MS) {
            self.probe.per_probe_timeout_ms = timeout_ms;
        }
        if let Some(max_concurrency) = util::parse_override(&lookup, util::MAX_CONCURRENCY) {
            self.probe.max_concurrency = max_concurrency;
        }
        if let Some(bind_addr) = util::parse_override(&lookup, util::BIND_ADDR) {
            self.api.bind_addr = bind_addr;
        }
        if let Some(token) = lookup(util::API_TOKEN).filter(|token| !token.is_empty()) {
            self.api.auth_token = Some(token);
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("connector-health/config.toml");
    path.exists().then_some(path)
}

/// Read a JSON or TOML config file, chosen by extension
pub fn read_config_file(path: &Path) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: Config = if is_toml {
        toml::from_str(&file_content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    } else {
        serde_json::from_str(&file_content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    };

    trace!("loaded config: {config:?}");
    Ok(config)
}
