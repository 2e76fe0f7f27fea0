//! Session registry — the shared set of currently-active player names.
//!
//! Consulted and updated by the event layer only; the record store never
//! touches it. Volatile by design, all entries are lost on restart.

use std::collections::HashSet;
use std::sync::RwLock;

/// Thread-safe set of display names with an active session
#[derive(Debug, Default)]
pub struct SessionRegistry {
    names: RwLock<HashSet<String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Mark a player as active. Returns false if they already were.
    pub fn add(&self, name: &str) -> bool {
        self.names.write().unwrap().insert(name.to_string())
    }

    /// Mark a player as inactive. Returns false if they were not active.
    pub fn remove(&self, name: &str) -> bool {
        self.names.write().unwrap().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.read().unwrap().contains(name)
    }

    /// Snapshot of the active names, sorted for stable output
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.read().unwrap().iter().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.names.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().unwrap().is_empty()
    }
}
