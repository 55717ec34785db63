//! Periodic reconciliation and idempotency housekeeping.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::application::idempotency::IdempotencyKeyer;
use crate::application::reconcile::Reconciler;

/// Runs [`Reconciler::reconcile_all`] on a fixed interval until shutdown.
///
/// A failed run is logged and the loop carries on with the next tick.
pub struct ReconcileScheduler {
    reconciler: Arc<Reconciler>,
    interval: Duration,
    gc: Option<(IdempotencyKeyer, Duration)>,
}

impl ReconcileScheduler {
    #[must_use]
    pub fn new(reconciler: Arc<Reconciler>, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
            gc: None,
        }
    }

    /// Also evict expired idempotency marks every `interval`.
    #[must_use]
    pub fn with_gc(mut self, keyer: IdempotencyKeyer, interval: Duration) -> Self {
        self.gc = Some((keyer, interval));
        self
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The first reconciliation runs immediately. Returns the number of
    /// completed runs.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut reconcile_tick = tokio::time::interval(self.interval);
        reconcile_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (keyer, gc_period) = match self.gc {
            Some((keyer, period)) => (Some(keyer), period),
            None => (None, Duration::from_secs(3600)),
        };
        let mut gc_tick = tokio::time::interval(gc_period);
        gc_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_secs = self.interval.as_secs(), "Reconciliation scheduler started");
        let mut runs = 0;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                _ = reconcile_tick.tick() => {
                    match self.reconciler.reconcile_all().await {
                        Ok(report) => {
                            runs += 1;
                            if !report.unreachable_venues.is_empty() {
                                warn!(
                                    venues = ?report.unreachable_venues,
                                    skipped = report.skipped,
                                    "Venues excluded from reconciliation"
                                );
                            }
                        }
                        Err(e) => error!(error = %e, "Reconciliation failed"),
                    }
                }
                _ = gc_tick.tick(), if keyer.is_some() => {
                    if let Some(keyer) = &keyer {
                        match keyer.evict_expired().await {
                            Ok(evicted) => debug!(evicted, "Idempotency marks evicted"),
                            Err(e) => warn!(error = %e, "Idempotency eviction failed"),
                        }
                    }
                }
            }
        }

        info!(runs, "Reconciliation scheduler stopped");
        runs
    }
}
