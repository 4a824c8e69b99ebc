//! Review session state
//!
//! One owned container for everything mutable during a review run: the
//! fetched ways, the position in them, the editor for the current way and
//! the upload queue. All mutation happens through explicit methods called
//! from the command loop; there are no ambient globals.

use rand::seq::SliceRandom;
use rand::thread_rng;

use tiger_common::editor::WayEditor;
use tiger_common::queue::UploadQueue;
use tiger_common::way::OsmWay;

pub struct ReviewSession {
    ways: Vec<OsmWay>,
    current: usize,
    editor: Option<WayEditor>,
    queue: UploadQueue,
}

impl ReviewSession {
    pub fn new() -> Self {
        ReviewSession {
            ways: Vec::new(),
            current: 0,
            editor: None,
            queue: UploadQueue::new(),
        }
    }

    /// Load freshly fetched ways: drop anything already queued from an
    /// earlier fetch, shuffle the rest so neighboring editors don't all
    /// walk the same streets in the same order, and open an editor on the
    /// first way.
    pub fn load_ways(&mut self, ways: Vec<OsmWay>) {
        let mut ways: Vec<OsmWay> = ways
            .into_iter()
            .filter(|way| !self.queue.contains(way.id))
            .collect();
        ways.shuffle(&mut thread_rng());
        self.ways = ways;
        self.current = 0;
        self.editor = self.ways.first().cloned().map(WayEditor::new);
    }

    /// Editor for the way under review; `None` once the area is finished
    pub fn editor(&mut self) -> Option<&mut WayEditor> {
        self.editor.as_mut()
    }

    pub fn editor_ref(&self) -> Option<&WayEditor> {
        self.editor.as_ref()
    }

    /// Move to the next way, discarding the current editor (and with it
    /// any per-way disposition state). Returns false when the area is
    /// exhausted.
    pub fn advance(&mut self) -> bool {
        self.current += 1;
        match self.ways.get(self.current) {
            Some(way) => {
                self.editor = Some(WayEditor::new(way.clone()));
                true
            }
            None => {
                self.editor = None;
                false
            }
        }
    }

    /// Append a finalized way and move on
    pub fn enqueue_and_advance(&mut self, way: OsmWay) -> bool {
        self.queue.enqueue(way);
        self.advance()
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut UploadQueue {
        &mut self.queue
    }

    /// Ways reviewed so far (position in the shuffled list)
    pub fn reviewed_count(&self) -> usize {
        self.current.min(self.ways.len())
    }

    pub fn total_count(&self) -> usize {
        self.ways.len()
    }

    pub fn is_finished(&self) -> bool {
        self.editor.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiger_common::way::Tags;

    fn way(id: u64) -> OsmWay {
        OsmWay {
            id,
            version: 1,
            nodes: vec![1, 2],
            tags: Tags::from([("highway".to_string(), "residential".to_string())]),
            bounds: None,
            geometry: Vec::new(),
            user: None,
        }
    }

    #[test]
    fn load_opens_editor_on_first_way() {
        let mut session = ReviewSession::new();
        assert!(session.is_finished());
        session.load_ways(vec![way(1), way(2)]);
        assert_eq!(session.total_count(), 2);
        assert!(session.editor().is_some());
        assert_eq!(session.reviewed_count(), 0);
    }

    #[test]
    fn advance_walks_to_the_end() {
        let mut session = ReviewSession::new();
        session.load_ways(vec![way(1), way(2)]);
        assert!(session.advance());
        assert!(!session.advance());
        assert!(session.is_finished());
        assert_eq!(session.reviewed_count(), 2);
    }

    #[test]
    fn refetch_skips_already_queued_ways() {
        let mut session = ReviewSession::new();
        session.load_ways(vec![way(1)]);
        let finalized = session.editor().unwrap().finalize_clear_tiger();
        session.enqueue_and_advance(finalized);
        assert_eq!(session.queue().len(), 1);

        session.load_ways(vec![way(1), way(2)]);
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.editor_ref().unwrap().way().id, 2);
    }

    #[test]
    fn enqueue_and_advance_feeds_the_queue() {
        let mut session = ReviewSession::new();
        session.load_ways(vec![way(1), way(2)]);
        let finalized = session.editor().unwrap().finalize_clear_tiger();
        let first_id = finalized.id;
        assert!(session.enqueue_and_advance(finalized));
        assert_eq!(session.queue().len(), 1);
        // the loaded order is shuffled; the editor moved to the other way
        assert_ne!(session.editor_ref().unwrap().way().id, first_id);
    }
}
