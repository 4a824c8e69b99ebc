//! Upload queue: finalized ways pending upload
//!
//! The queue is the sole source of truth for "pending upload" counts.
//! Entries are complete and self-consistent before they enter (they only
//! come from `WayEditor` finalizers), and the order is the review order.

use crate::way::OsmWay;

#[derive(Debug, Default, Clone)]
pub struct UploadQueue {
    ways: Vec<OsmWay>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized way
    pub fn enqueue(&mut self, way: OsmWay) {
        self.ways.push(way);
    }

    /// Remove one entry, shifting subsequent indices down. Out-of-range
    /// indices are a no-op.
    pub fn remove_at(&mut self, index: usize) {
        if index < self.ways.len() {
            self.ways.remove(index);
        }
    }

    /// Discard everything (after a successful upload, or on explicit user
    /// discard)
    pub fn clear(&mut self) {
        self.ways.clear();
    }

    pub fn len(&self) -> usize {
        self.ways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    /// Whether a way id is already queued (refetches are deduplicated
    /// against the queue)
    pub fn contains(&self, id: u64) -> bool {
        self.ways.iter().any(|way| way.id == id)
    }

    pub fn ways(&self) -> &[OsmWay] {
        &self.ways
    }
}
