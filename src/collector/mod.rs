pub mod registry;
pub mod selector;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Instrument};

use crate::client::Connect;
use crate::error::{ClientError, GatherError};
use crate::sink::Accumulator;
use crate::types::Config;

pub use registry::{CollectContext, CollectFn, CollectorRegistry};
pub use selector::{select, WorkingSet};

/// Outcome of one poll. Collector failures are not listed here: they go to
/// the accumulator's error channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Collectors that were started, sorted by name.
    pub ran: Vec<String>,
    /// Collectors that panicked instead of finishing.
    pub panicked: Vec<String>,
}

/// Runs the selected collectors of a registry concurrently, one poll at a time
/// or several at once, against a lazily created shared client.
pub struct Gatherer<F: Connect> {
    connector: F,
    registry: CollectorRegistry<F::Client>,
    client: Mutex<Option<F::Client>>,
    shutdown: CancellationToken,
}

impl<F: Connect> Gatherer<F> {
    pub fn new(connector: F, registry: CollectorRegistry<F::Client>) -> Self {
        Self {
            connector,
            registry,
            client: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> &CollectorRegistry<F::Client> {
        &self.registry
    }

    /// Runs one poll cycle.
    ///
    /// Returns an error only when the client cannot be built or the include
    /// list names an unknown collector. Otherwise waits for every selected
    /// collector to finish and succeeds, however many of them failed.
    pub async fn poll(&self, cfg: &Config, acc: Arc<dyn Accumulator>) -> Result<PollSummary, GatherError> {
        let client = self.client(cfg).await?;
        let selected = select(&self.registry, &cfg.resource_include, &cfg.resource_exclude)?;

        let config = Arc::new(cfg.clone());
        let cancel = self.shutdown.child_token();
        let mut summary = PollSummary::default();
        let mut tasks = JoinSet::new();

        info!("polling {} collector(s)", selected.len());
        for (name, routine) in selected {
            let ctx = CollectContext {
                client: client.clone(),
                acc: Arc::clone(&acc),
                config: Arc::clone(&config),
                cancel: cancel.clone(),
            };
            summary.ran.push(name.clone());

            let span = tracing::debug_span!("collector", name = %name);
            tasks.spawn(
                async move {
                    let started = Instant::now();
                    let finished = AssertUnwindSafe(routine(ctx)).catch_unwind().await.is_ok();
                    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "collector finished");
                    (name, finished)
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, true)) => {}
                Ok((name, false)) => {
                    error!(collector = %name, "collector panicked");
                    summary.panicked.push(name);
                }
                Err(e) => error!("collector task failed to join: {}", e),
            }
        }

        summary.ran.sort();
        summary.panicked.sort();
        info!(
            "poll finished: {} collector(s) ran, {} panicked",
            summary.ran.len(),
            summary.panicked.len()
        );
        Ok(summary)
    }

    /// Returns the shared client, building it on first use. A failed build
    /// leaves nothing cached so the next poll tries again.
    async fn client(&self, cfg: &Config) -> Result<F::Client, ClientError> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = self.connector.connect(cfg).await.map_err(|e| {
            error!("failed to create kubernetes client: {}", e);
            e
        })?;
        info!(url = %cfg.url, "kubernetes client initialized");
        *slot = Some(client.clone());
        Ok(client)
    }

    pub async fn has_client(&self) -> bool {
        self.client.lock().await.is_some()
    }

    /// Drops the cached client; the next poll builds a new one.
    pub async fn reset_client(&self) {
        self.client.lock().await.take();
    }

    /// Cancels collectors of in-flight and future polls.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
