//! Owned registry of venue adapters.
//!
//! Built once in the composition root and passed to the components that need
//! venues. The registry owns adapter lifecycle: [`VenueRegistry::close`]
//! releases every adapter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Venue, VenueId};
use crate::port::VenueAdapter;

struct Entry {
    profile: Venue,
    adapter: Arc<dyn VenueAdapter>,
    reachable: AtomicBool,
}

/// Venue adapters and routing profiles, in registration order.
#[derive(Default)]
pub struct VenueRegistry {
    entries: Vec<Entry>,
}

impl VenueRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a venue, replacing any previous entry with the same name.
    ///
    /// Returns the replaced adapter, if any. The profile's name is
    /// authoritative; the adapter is expected to serve that venue.
    pub fn register(
        &mut self,
        profile: Venue,
        adapter: Arc<dyn VenueAdapter>,
    ) -> Option<Arc<dyn VenueAdapter>> {
        let entry = Entry {
            profile,
            adapter,
            reachable: AtomicBool::new(true),
        };
        match self
            .entries
            .iter_mut()
            .find(|e| e.profile.name == entry.profile.name)
        {
            Some(existing) => Some(std::mem::replace(existing, entry).adapter),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn adapter(&self, venue: &VenueId) -> Option<Arc<dyn VenueAdapter>> {
        self.entry(venue).map(|e| Arc::clone(&e.adapter))
    }

    #[must_use]
    pub fn profile(&self, venue: &VenueId) -> Option<&Venue> {
        self.entry(venue).map(|e| &e.profile)
    }

    /// All adapters with their venue names, in registration order.
    #[must_use]
    pub fn adapters(&self) -> Vec<(VenueId, Arc<dyn VenueAdapter>)> {
        self.entries
            .iter()
            .map(|e| (e.profile.name.clone(), Arc::clone(&e.adapter)))
            .collect()
    }

    /// All routing profiles, in registration order.
    #[must_use]
    pub fn profiles(&self) -> Vec<Venue> {
        self.entries.iter().map(|e| e.profile.clone()).collect()
    }

    /// Profiles of venues not currently marked unreachable.
    #[must_use]
    pub fn reachable_profiles(&self) -> Vec<Venue> {
        self.entries
            .iter()
            .filter(|e| e.reachable.load(Ordering::Acquire))
            .map(|e| e.profile.clone())
            .collect()
    }

    #[must_use]
    pub fn is_reachable(&self, venue: &VenueId) -> bool {
        self.entry(venue)
            .is_some_and(|e| e.reachable.load(Ordering::Acquire))
    }

    /// Record whether the last contact with `venue` succeeded.
    pub fn set_reachable(&self, venue: &VenueId, reachable: bool) {
        if let Some(entry) = self.entry(venue) {
            let was = entry.reachable.swap(reachable, Ordering::AcqRel);
            if was != reachable {
                info!(venue = %venue, reachable, "Venue reachability changed");
            }
        }
    }

    /// Close every adapter. Failures are logged, not returned.
    pub async fn close(&self) {
        for entry in &self.entries {
            if let Err(e) = entry.adapter.close().await {
                warn!(venue = %entry.profile.name, error = %e, "Failed to close venue adapter");
            }
        }
    }

    fn entry(&self, venue: &VenueId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.profile.name == venue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::paper::PaperVenue;

    fn profile(name: &str) -> Venue {
        Venue::new(name, 0.0005, 0.0, 30, 0.5)
    }

    #[test]
    fn register_keeps_order_and_replaces_by_name() {
        let mut registry = VenueRegistry::new();
        assert!(registry
            .register(profile("a"), Arc::new(PaperVenue::new("a")))
            .is_none());
        registry.register(profile("b"), Arc::new(PaperVenue::new("b")));
        assert!(registry
            .register(profile("a"), Arc::new(PaperVenue::new("a")))
            .is_some());

        let names: Vec<_> = registry.profiles().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec![VenueId::from("a"), VenueId::from("b")]);
    }

    #[test]
    fn unreachable_venues_drop_out_of_routing() {
        let mut registry = VenueRegistry::new();
        registry.register(profile("a"), Arc::new(PaperVenue::new("a")));
        registry.register(profile("b"), Arc::new(PaperVenue::new("b")));

        registry.set_reachable(&VenueId::from("a"), false);
        let reachable = registry.reachable_profiles();
        assert_eq!(reachable.len(), 1);
        assert_eq!(reachable[0].name.as_str(), "b");
        assert!(!registry.is_reachable(&VenueId::from("a")));
        assert!(!registry.is_reachable(&VenueId::from("unknown")));
    }
}
