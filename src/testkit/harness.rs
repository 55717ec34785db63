//! A control plane over an in-memory ledger and paper venues.

use std::sync::Arc;
use std::time::Duration;

use crate::adapter::outbound::{MemoryLedger, PaperVenue};
use crate::application::oms::Oms;
use crate::application::reconcile::Reconciler;
use crate::application::registry::VenueRegistry;
use crate::domain::Venue;
use crate::port::{Ledger, VenueAdapter};

/// Ledger, paper venues and the services over them.
pub struct Harness {
    pub ledger: Arc<MemoryLedger>,
    pub venues: Vec<Arc<PaperVenue>>,
    pub oms: Arc<Oms>,
    pub reconciler: Reconciler,
}

impl Harness {
    /// One paper venue per profile, in order. Venue calls time out after
    /// 100ms.
    pub fn new(profiles: Vec<Venue>) -> Self {
        Self::with_timeout(profiles, Duration::from_millis(100))
    }

    pub fn with_timeout(profiles: Vec<Venue>, venue_timeout: Duration) -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        let mut registry = VenueRegistry::new();
        let mut venues = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let venue = Arc::new(PaperVenue::new(profile.name.clone()));
            registry.register(profile, Arc::clone(&venue) as Arc<dyn VenueAdapter>);
            venues.push(venue);
        }
        let oms = Arc::new(Oms::with_timeout(
            Arc::clone(&ledger) as Arc<dyn Ledger>,
            Arc::new(registry),
            venue_timeout,
        ));
        let reconciler = Reconciler::with_timeout(Arc::clone(&oms), venue_timeout);
        Self {
            ledger,
            venues,
            oms,
            reconciler,
        }
    }

    /// The paper venue named `name`.
    pub fn venue(&self, name: &str) -> Arc<PaperVenue> {
        match self.venues.iter().find(|v| v.venue().as_str() == name) {
            Some(venue) => Arc::clone(venue),
            None => panic!("no paper venue named {name}"),
        }
    }
}
