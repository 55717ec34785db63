//! Composition root: builds the control plane from configuration.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::{MemoryIdempotencyStore, MemoryLedger, PaperVenue};
use crate::application::admission::Admission;
use crate::application::idempotency::IdempotencyKeyer;
use crate::application::oms::Oms;
use crate::application::reconcile::Reconciler;
use crate::application::registry::VenueRegistry;
use crate::application::router::VenueRouter;
use crate::application::safety::{RiskLimits, SafetyGate};
use crate::domain::ClockGuard;
use crate::infrastructure::config::Config;
use crate::infrastructure::scheduler::ReconcileScheduler;
use crate::port::{Ledger, VenueAdapter};

/// Every long-lived component, wired together.
pub struct ControlPlane {
    pub registry: Arc<VenueRegistry>,
    pub oms: Arc<Oms>,
    pub keyer: IdempotencyKeyer,
    pub admission: Admission,
    pub reconciler: Arc<Reconciler>,
}

impl ControlPlane {
    /// Scheduler for the configured reconciliation and eviction intervals.
    #[must_use]
    pub fn scheduler(&self, config: &Config) -> ReconcileScheduler {
        ReconcileScheduler::new(Arc::clone(&self.reconciler), config.reconcile.interval())
            .with_gc(self.keyer.clone(), config.idempotency.gc_interval())
    }

    /// Release every venue adapter.
    pub async fn shutdown(&self) {
        self.registry.close().await;
    }
}

/// Build the registry with one paper venue per configured venue.
#[must_use]
pub fn build_paper_registry(config: &Config) -> VenueRegistry {
    let mut registry = VenueRegistry::new();
    for profile in config.venue_profiles() {
        let adapter: Arc<dyn VenueAdapter> = Arc::new(PaperVenue::new(profile.name.clone()));
        registry.register(profile, adapter);
    }
    registry
}

/// Wire the control plane over the given ledger and venues.
#[must_use]
pub fn build_control_plane(
    config: &Config,
    ledger: Arc<dyn Ledger>,
    registry: VenueRegistry,
) -> ControlPlane {
    let registry = Arc::new(registry);
    let oms = Arc::new(Oms::with_timeout(
        ledger,
        Arc::clone(&registry),
        config.reconcile.venue_timeout(),
    ));

    let store = Arc::new(MemoryIdempotencyStore::new(config.idempotency.max_entries));
    let keyer = IdempotencyKeyer::with_ttl(store, config.idempotency.ttl());

    let admission = Admission::new(
        ClockGuard::from(&config.clock),
        keyer.clone(),
        SafetyGate::new(RiskLimits::from(&config.risk)),
        VenueRouter::new(config.router.weights()),
        config.router.max_latency_ms,
        Arc::clone(&oms),
    );
    let reconciler = Arc::new(Reconciler::with_timeout(
        Arc::clone(&oms),
        config.reconcile.venue_timeout(),
    ));

    info!(venues = registry.len(), "Control plane initialized");
    ControlPlane {
        registry,
        oms,
        keyer,
        admission,
        reconciler,
    }
}

/// Control plane over an in-memory ledger and paper venues.
#[must_use]
pub fn build_paper(config: &Config) -> ControlPlane {
    build_control_plane(
        config,
        Arc::new(MemoryLedger::new()),
        build_paper_registry(config),
    )
}
