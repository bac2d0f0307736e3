//! crates/taskdeck_core/src/sequence.rs
//!
//! Per-record request sequencing. Each request for a record gets a number that
//! only grows; a response is applied only if nothing newer for the same record
//! has been applied already, so a slow early response cannot overwrite a later one.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    issued: u64,
    applied: u64,
}

#[derive(Debug, Clone)]
pub struct RequestSequencer<K> {
    counters: HashMap<K, Counters>,
}

impl<K: Eq + Hash> Default for RequestSequencer<K> {
    fn default() -> Self {
        Self {
            counters: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> RequestSequencer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next sequence number for `key`.
    pub fn issue(&mut self, key: K) -> u64 {
        let counters = self.counters.entry(key).or_default();
        counters.issued += 1;
        counters.issued
    }

    /// Records that the response for `seq` arrived. Returns `false` when a
    /// newer response for the same key was already applied.
    pub fn accept(&mut self, key: K, seq: u64) -> bool {
        let counters = self.counters.entry(key).or_default();
        if seq <= counters.applied {
            return false;
        }
        counters.applied = seq;
        true
    }
}
