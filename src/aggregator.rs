//! Aggregator - fans probes out over a bounded worker pool
//!
//! One call to [`Aggregator::run`] is one aggregation cycle:
//!
//! ```text
//! registry.list() ─► [d0, d1, ... dN-1]
//!                        │ shared cursor
//!         ┌──────────────┼──────────────┐
//!     worker 0       worker 1  ...  worker C-1      (C = min(max_concurrency, N))
//!         │              │              │
//!         └──── (index, ProbeResult) ───┘  mpsc
//!                        │
//!                 slots[index] = result ─► StatusReport (registry order)
//! ```
//!
//! Workers pull the next unprobed index from a shared cursor, so a new probe
//! starts only when an in-flight one finishes. Results travel back tagged
//! with their registry index and land in a pre-sized slot vector, which keeps
//! registry order without sorting.
//!
//! ## Isolation
//!
//! Each probe runs under its own deadline. A probe that panics is caught by
//! its worker: the slot is reported as `aborted` and the worker moves on to
//! the next index, so the pool never shrinks during a cycle. Slots left empty
//! by a worker that died anyway are reported as `aborted` too. Dropping the
//! future returned by `run` aborts every worker and with them all in-flight
//! requests.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, debug_span, error, info, instrument, warn};

use crate::config::ProbeSettings;
use crate::probe::{HealthProbe, health_url};
use crate::registry::{ConnectorDescriptor, ConnectorRegistry, RegistryResult, ensure_unique_ids};
use crate::report::{ProbeFailure, ProbeResult, StatusReport};

/// Runs aggregation cycles with a shared probe
///
/// The aggregator holds no per-cycle state, so one instance can serve any
/// number of concurrent cycles.
#[derive(Clone)]
pub struct Aggregator {
    probe: Arc<dyn HealthProbe>,
    settings: ProbeSettings,
}

impl Aggregator {
    pub fn new(probe: Arc<dyn HealthProbe>, settings: ProbeSettings) -> Self {
        Self { probe, settings }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Run one cycle with the configured timeout and concurrency
    pub async fn run_configured(
        &self,
        registry: &dyn ConnectorRegistry,
    ) -> RegistryResult<StatusReport> {
        self.run(
            registry,
            self.settings.per_probe_timeout(),
            self.settings.max_concurrency(),
        )
        .await
    }

    /// Run one aggregation cycle
    ///
    /// Fails only when the registry cannot produce its connector list.
    /// Every connector failure is reported as an item instead.
    #[instrument(skip(self, registry))]
    pub async fn run(
        &self,
        registry: &dyn ConnectorRegistry,
        per_probe_timeout: Duration,
        max_concurrency: usize,
    ) -> RegistryResult<StatusReport> {
        let connectors = registry.list().await?;
        ensure_unique_ids(&connectors)?;

        debug!("starting cycle over {} connectors", connectors.len());

        let items = self
            .probe_all(connectors, per_probe_timeout, max_concurrency)
            .await;
        let report = StatusReport::new(items);

        let summary = report.summary();
        info!(
            "cycle finished: {} connectors, {} healthy, {} unhealthy",
            summary.total, summary.healthy, summary.unhealthy
        );

        Ok(report)
    }

    async fn probe_all(
        &self,
        connectors: Vec<ConnectorDescriptor>,
        per_probe_timeout: Duration,
        max_concurrency: usize,
    ) -> Vec<ProbeResult> {
        let total = connectors.len();
        if total == 0 {
            return Vec::new();
        }

        let connectors: Arc<[ConnectorDescriptor]> = connectors.into();
        let cursor = Arc::new(AtomicUsize::new(0));
        let worker_count = max_concurrency.max(1).min(total);

        // capacity `total` means workers never wait on the collector
        let (result_tx, mut result_rx) = mpsc::channel(total);
        let mut workers = JoinSet::new();

        for worker in 0..worker_count {
            let probe = Arc::clone(&self.probe);
            let connectors = Arc::clone(&connectors);
            let cursor = Arc::clone(&cursor);
            let result_tx = result_tx.clone();

            workers.spawn(
                async move {
                    loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(descriptor) = connectors.get(index) else {
                            break;
                        };

                        let result = AssertUnwindSafe(probe_with_deadline(
                            &*probe,
                            descriptor,
                            per_probe_timeout,
                        ))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            error!("{}: probe panicked, reporting as aborted", descriptor.id);
                            ProbeResult::unhealthy(
                                descriptor,
                                health_url(&descriptor.base_url),
                                ProbeFailure::Aborted,
                            )
                        });

                        if result_tx.send((index, result)).await.is_err() {
                            break;
                        }
                    }
                }
                .instrument(debug_span!("probe_worker", worker)),
            );
        }
        drop(result_tx);

        let mut slots: Vec<Option<ProbeResult>> = (0..total).map(|_| None).collect();
        while let Some((index, result)) = result_rx.recv().await {
            slots[index] = Some(result);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("probe worker died: {e}");
            }
        }

        slots
            .into_iter()
            .zip(connectors.iter())
            .map(|(slot, descriptor)| {
                slot.unwrap_or_else(|| {
                    warn!("{}: no probe result, reporting as aborted", descriptor.id);
                    ProbeResult::unhealthy(
                        descriptor,
                        health_url(&descriptor.base_url),
                        ProbeFailure::Aborted,
                    )
                })
            })
            .collect()
    }
}

/// Bound a probe by the cycle's deadline even if it ignores its own
async fn probe_with_deadline(
    probe: &dyn HealthProbe,
    descriptor: &ConnectorDescriptor,
    timeout: Duration,
) -> ProbeResult {
    match tokio::time::timeout(timeout, probe.check(descriptor, timeout)).await {
        Ok(result) => result,
        Err(_) => {
            let failure = ProbeFailure::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            };
            warn!("{}: {failure}", descriptor.id);
            ProbeResult::unhealthy(descriptor, health_url(&descriptor.base_url), failure)
        }
    }
}
