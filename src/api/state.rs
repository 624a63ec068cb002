//! API shared state

use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::registry::ConnectorRegistry;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Runs one aggregation cycle per status request
    pub aggregator: Aggregator,

    /// Registry consulted at the start of every cycle
    pub registry: Arc<dyn ConnectorRegistry>,
}

impl ApiState {
    pub fn new(aggregator: Aggregator, registry: Arc<dyn ConnectorRegistry>) -> Self {
        Self {
            aggregator,
            registry,
        }
    }
}
