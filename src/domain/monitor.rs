/// Health and energy observers.
///
/// UI screens register an observer under an id of their choosing.
/// Registering again under the same id swaps the observer, so a screen never
/// has to remember what it registered last.

use std::collections::HashMap;
use std::rc::Rc;

/// Notified whenever the trooper's cell count changes.
pub trait HealthMonitor {
    fn health_updated(&self, health: u32, mid: u32, max: u32);
}

/// Notified whenever cloak or teleport energy changes.
pub trait EnergyMonitor {
    fn energy_updated(&self, teleport: u32, teleport_max: u32, cloak: u32, cloak_max: u32);
}

/// Observers keyed by id. Iteration order is unspecified.
pub struct Monitors<M: ?Sized> {
    entries: HashMap<String, Rc<M>>,
}

impl<M: ?Sized> Default for Monitors<M> {
    fn default() -> Self {
        Monitors { entries: HashMap::new() }
    }
}

impl<M: ?Sized> Monitors<M> {
    pub fn monitor(&mut self, id: &str, observer: Rc<M>) {
        self.entries.insert(id.to_string(), observer);
    }

    pub fn ignore(&mut self, id: &str) {
        self.entries.remove(id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<M>> {
        self.entries.values()
    }
}
