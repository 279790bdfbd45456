//! One stock watch widget: configuration, quote store and refresh timer.
//!
//! The host drives a `StockWidget` through three calls: `configure` whenever
//! its configuration object changes, `attach` when the widget becomes visible
//! and `detach` when it goes away. Renderers either poll [`StockWidget::snapshot`]
//! or await changes on [`StockWidget::subscribe`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::watch;
use yasc_common::config::{RawConfig, WatchConfig};
use yasc_common::error::{ConfigError, YascError};
use yasc_common::store::{QuoteStore, Snapshot};

use crate::resolver::QuoteResolver;
use crate::scheduler::RefreshScheduler;
use crate::source::QuoteSource;

/// State shared with the refresh task.
struct Shared {
    config: RwLock<Option<Arc<WatchConfig>>>,
    store: Mutex<QuoteStore>,
    cycles: AtomicU64,
    snapshots: watch::Sender<Option<Snapshot>>,
}

impl Shared {
    /// Prune orphaned quotes and publish a snapshot for the current config.
    fn publish(&self) -> Result<(), YascError> {
        let Some(config) = self.config.read()?.clone() else {
            return Ok(());
        };
        let snapshot = {
            let mut store = self.store.lock()?;
            let pruned = store.prune(&config);
            if pruned > 0 {
                debug!("Pruned {pruned} quote(s) of removed symbols");
            }
            store.snapshot(&config, self.cycles.load(Ordering::SeqCst))
        };
        self.snapshots.send_replace(Some(snapshot));
        Ok(())
    }
}

/// A stock watch widget instance.
pub struct StockWidget {
    source: Arc<dyn QuoteSource>,
    shared: Arc<Shared>,
    scheduler: RefreshScheduler,
    attached: bool,
}

impl StockWidget {
    /// Unconfigured, detached widget resolving quotes through `source`.
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        let (snapshots, _) = watch::channel(None);
        StockWidget {
            source,
            shared: Arc::new(Shared {
                config: RwLock::new(None),
                store: Mutex::new(QuoteStore::new()),
                cycles: AtomicU64::new(0),
                snapshots,
            }),
            scheduler: RefreshScheduler::new(),
            attached: false,
        }
    }

    /// Normalise and apply a host configuration object.
    ///
    /// On error the previous configuration stays in effect.
    pub fn configure(&mut self, raw: &RawConfig) -> Result<(), ConfigError> {
        let config = raw.normalize()?;
        self.reconfigure(config);
        Ok(())
    }

    /// Replace the configuration wholesale.
    ///
    /// Quotes of symbols no longer configured are dropped and a snapshot is
    /// published right away. An attached widget restarts its timer, which
    /// also runs a fresh cycle immediately.
    pub fn reconfigure(&mut self, config: WatchConfig) {
        info!(
            "Watching {} every {}s",
            config.symbols().join(", "),
            config.refresh_interval()
        );
        let config = Arc::new(config);
        match self.shared.config.write() {
            Ok(mut current) => *current = Some(config),
            Err(e) => {
                error!("Configuration lock poisoned: {e}");
                return;
            }
        }
        if let Err(e) = self.shared.publish() {
            error!("Failed to publish snapshot: {e}");
        }
        if self.attached {
            self.start_refreshing();
        }
    }

    /// Host attached the widget: start refreshing if configured.
    pub fn attach(&mut self) {
        self.attached = true;
        self.start_refreshing();
    }

    /// Host detached the widget: stop refreshing.
    pub fn detach(&mut self) {
        self.attached = false;
        self.scheduler.stop();
        info!("Widget detached");
    }

    /// Whether the host has the widget attached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the refresh timer is armed.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Current configuration.
    pub fn config(&self) -> Option<Arc<WatchConfig>> {
        self.shared
            .config
            .read()
            .ok()
            .and_then(|config| config.clone())
    }

    /// Completed resolution cycles.
    pub fn cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::SeqCst)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.shared.snapshots.borrow().clone()
    }

    /// Receiver notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.shared.snapshots.subscribe()
    }

    fn start_refreshing(&mut self) {
        let Some(config) = self.config() else {
            debug!("Attached without configuration; waiting for one");
            return;
        };
        let resolver = Arc::new(QuoteResolver::new(self.source.clone(), &config));
        let shared = self.shared.clone();
        let period = Duration::from_secs(config.refresh_interval());
        info!("Refreshing every {}s", period.as_secs());

        self.scheduler.start(period, move || {
            let (shared, resolver, config) = (shared.clone(), resolver.clone(), config.clone());
            async move {
                let report = resolver.resolve_cycle(config.entries(), &shared.store).await;
                let cycle = shared.cycles.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(
                    "Refresh cycle {cycle} done: {} live, {} demo",
                    report.live, report.demo
                );
                if let Err(e) = shared.publish() {
                    error!("Failed to publish snapshot: {e}");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::OfflineSource;
    use crate::source::testing::FixedSource;
    use serde_json::json;
    use tokio::time::sleep;
    use yasc_common::quote::MarketState;

    fn raw(value: serde_json::Value) -> RawConfig {
        serde_json::from_value(value).unwrap()
    }

    fn row_symbols(snapshot: &Snapshot) -> Vec<String> {
        snapshot.rows.iter().map(|q| q.symbol.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn configure_publishes_loading_rows() {
        let mut widget = StockWidget::new(Arc::new(OfflineSource));
        assert!(widget.snapshot().is_none());

        widget.configure(&raw(json!({ "symbol": "aapl" }))).unwrap();
        let snapshot = widget.snapshot().unwrap();
        assert_eq!(snapshot.cycle, 0);
        assert_eq!(row_symbols(&snapshot), vec!["AAPL"]);
        assert_eq!(snapshot.rows[0].market_state, MarketState::Loading);
        assert!(!widget.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn attach_resolves_every_symbol() {
        let source = Arc::new(FixedSource::new(&[("AAPL", 110.0, 100.0)]));
        let mut widget = StockWidget::new(source);
        widget
            .configure(&raw(json!({ "symbols": ["aapl", "zzzz"], "names": ["Apple"] })))
            .unwrap();
        widget.attach();
        sleep(Duration::from_millis(1)).await;

        let snapshot = widget.snapshot().unwrap();
        assert_eq!(snapshot.cycle, 1);
        let apple = snapshot.row("AAPL").unwrap();
        assert_eq!(apple.display_name, "Apple");
        assert_eq!(apple.change_text(), "10.00");
        assert_eq!(apple.market_state, MarketState::Regular);
        let demo = snapshot.row("ZZZZ").unwrap();
        assert_eq!(demo.market_state, MarketState::Demo);
        assert!(demo.failure.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_interval_until_detached() {
        let source = Arc::new(FixedSource::new(&[("AAPL", 1.0, 1.0)]));
        let mut widget = StockWidget::new(source.clone());
        widget
            .configure(&raw(json!({ "symbol": "AAPL", "update_interval": 10 })))
            .unwrap();
        widget.attach();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(widget.cycles(), 1);

        sleep(Duration::from_secs(25)).await;
        assert_eq!(widget.cycles(), 3);
        assert_eq!(source.calls(), 3);

        widget.detach();
        assert!(!widget.is_running());
        sleep(Duration::from_secs(100)).await;
        assert_eq!(widget.cycles(), 3);

        widget.attach();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(widget.cycles(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn attach_before_configure_waits() {
        let mut widget = StockWidget::new(Arc::new(OfflineSource));
        widget.attach();
        assert!(!widget.is_running());

        widget.configure(&RawConfig::single("msft")).unwrap();
        assert!(widget.is_running());
        sleep(Duration::from_millis(1)).await;
        assert_eq!(widget.cycles(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_config_keeps_previous_one() {
        let mut widget = StockWidget::new(Arc::new(OfflineSource));
        widget.configure(&RawConfig::single("tsla")).unwrap();
        let err = widget.configure(&RawConfig::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingSymbol);
        assert_eq!(widget.config().unwrap().symbols(), vec!["TSLA"]);
    }

    #[tokio::test(start_paused = true)]
    async fn removed_symbols_are_pruned() {
        let mut widget = StockWidget::new(Arc::new(OfflineSource));
        widget
            .configure(&raw(json!({ "symbols": ["AAPL", "MSFT"] })))
            .unwrap();
        widget.attach();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(widget.shared.store.lock().unwrap().len(), 2);

        widget.configure(&raw(json!({ "symbols": ["MSFT"] }))).unwrap();
        assert_eq!(widget.shared.store.lock().unwrap().len(), 1);
        assert_eq!(row_symbols(&widget.snapshot().unwrap()), vec!["MSFT"]);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_cycle_cannot_restore_removed_symbols() {
        let source = Arc::new(
            FixedSource::new(&[("SLOW", 2.0, 1.0), ("FAST", 3.0, 1.0)])
                .with_delay("SLOW", Duration::from_secs(5)),
        );
        let mut widget = StockWidget::new(source);
        widget
            .configure(&raw(json!({ "symbols": ["SLOW", "FAST"], "update_interval": 60 })))
            .unwrap();
        widget.attach();
        sleep(Duration::from_secs(1)).await;

        widget.configure(&raw(json!({ "symbols": ["FAST"], "update_interval": 60 }))).unwrap();
        sleep(Duration::from_secs(10)).await;

        // The first cycle finished at t=5s and stored SLOW before publishing.
        assert_eq!(widget.cycles(), 2);
        assert!(widget.shared.store.lock().unwrap().get("SLOW").is_none());
        assert_eq!(row_symbols(&widget.snapshot().unwrap()), vec!["FAST"]);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_waits_for_the_whole_cycle() {
        let source = Arc::new(
            FixedSource::new(&[("SLOW", 2.0, 1.0), ("FAST", 3.0, 1.0)])
                .with_delay("SLOW", Duration::from_secs(5)),
        );
        let mut widget = StockWidget::new(source);
        widget
            .configure(&raw(json!({ "symbols": ["SLOW", "FAST"], "update_interval": 60 })))
            .unwrap();
        let mut updates = widget.subscribe();
        widget.attach();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(widget.snapshot().unwrap().cycle, 0);

        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone().unwrap();
        assert_eq!(snapshot.cycle, 1);
        assert!(snapshot.rows.iter().all(|q| q.market_state == MarketState::Regular));
    }

    #[tokio::test(start_paused = true)]
    async fn reconfigure_restarts_with_new_interval() {
        let mut widget = StockWidget::new(Arc::new(OfflineSource));
        widget
            .configure(&raw(json!({ "symbol": "AAPL", "update_interval": 60 })))
            .unwrap();
        widget.attach();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(widget.cycles(), 1);

        let faster = widget.config().unwrap().with_refresh_interval(10);
        widget.reconfigure(faster);
        sleep(Duration::from_millis(1)).await;
        assert_eq!(widget.cycles(), 2);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(widget.cycles(), 3);
    }
}
