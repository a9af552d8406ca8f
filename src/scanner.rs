use crate::catalog::Catalog;
use crate::config::ScannerConfig;
use crate::evaluator;
use crate::market_fetcher::MarketDataProvider;
use crate::shared_types::ScanResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tracing::{debug, info};

/// Notification collaborator. Formatting and delivery are entirely the
/// sink's business; the loop only hands over ranked results.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish_results(&self, results: &[ScanResult]);
    async fn publish_no_opportunities(&self);
}

/// Control handle over the background scan worker. Two states: Idle (no
/// stored token) and Scanning (a live token handed to the worker at spawn).
/// `stop` flips the token; the in-flight pass drains before the worker
/// exits, so cancellation latency is up to one pass plus the cycle delay.
pub struct ArbitrageScanner {
    catalog: Arc<Catalog>,
    provider: Arc<dyn MarketDataProvider>,
    sink: Arc<dyn NotificationSink>,
    config: ScannerConfig,
    worker: Mutex<Option<Arc<AtomicBool>>>,
}

impl ArbitrageScanner {
    pub fn new(
        catalog: Arc<Catalog>,
        provider: Arc<dyn MarketDataProvider>,
        sink: Arc<dyn NotificationSink>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            catalog,
            provider,
            sink,
            config,
            worker: Mutex::new(None),
        }
    }

    pub fn start(&self) -> &'static str {
        let mut worker = self.worker.lock().expect("scanner state poisoned");
        if worker.is_some() {
            return "scanner already running";
        }

        let cancel = Arc::new(AtomicBool::new(true));
        *worker = Some(cancel.clone());
        tokio::spawn(run_scan_loop(
            self.catalog.clone(),
            self.provider.clone(),
            self.sink.clone(),
            self.config.clone(),
            cancel,
        ));
        "scanner started"
    }

    pub fn stop(&self) -> &'static str {
        let mut worker = self.worker.lock().expect("scanner state poisoned");
        match worker.take() {
            Some(cancel) => {
                cancel.store(false, Ordering::SeqCst);
                "scanner stopped"
            }
            None => "scanner is not running",
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.lock().expect("scanner state poisoned").is_some()
    }
}

/// One worker: evaluate every route in catalog order, rank, emit, sleep,
/// repeat. The cancellation token is polled once per pass, never mid-pass.
async fn run_scan_loop(
    catalog: Arc<Catalog>,
    provider: Arc<dyn MarketDataProvider>,
    sink: Arc<dyn NotificationSink>,
    config: ScannerConfig,
    cancel: Arc<AtomicBool>,
) {
    info!("scan loop started over {} routes", catalog.routes().len());
    while cancel.load(Ordering::SeqCst) {
        let mut results = Vec::new();
        for route in catalog.routes() {
            if let Some(hit) =
                evaluator::evaluate(route, &catalog, provider.as_ref(), &config).await
            {
                debug!("route {} nets {}%", hit.route, hit.profit_percent);
                results.push(hit);
            }
            sleep(config.route_pacing).await;
        }

        // Stable sort keeps catalog order among equal returns.
        results.sort_by(|a, b| b.profit_percent.cmp(&a.profit_percent));
        results.truncate(config.page_size);

        if results.is_empty() {
            sink.publish_no_opportunities().await;
        } else {
            info!("pass surfaced {} qualifying routes", results.len());
            sink.publish_results(&results).await;
        }
        sleep(config.cycle_delay).await;
    }
    info!("scan loop exited");
}
