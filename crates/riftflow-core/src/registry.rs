use rustc_hash::{FxHashMap, FxHashSet};
use crate::ids::{ReceiverId, SourceId};

/// Issues ids to sources and receivers and stores the directional "ignore"
/// relation receiver -> {sources}.
///
/// Lookups are always receiver-first; a receiver without an entry interacts
/// with every source.
#[derive(Debug)]
pub struct InteractionRegistry {
    next_id: u32,
    ignore: FxHashMap<ReceiverId, FxHashSet<SourceId>>,
}

impl Default for InteractionRegistry { fn default() -> Self { Self::new() } }

impl InteractionRegistry {
    pub fn new() -> Self { Self { next_id: 1, ignore: FxHashMap::default() } }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn issue_source_id(&mut self) -> SourceId { SourceId(self.next()) }
    pub fn issue_receiver_id(&mut self) -> ReceiverId { ReceiverId(self.next()) }

    /// Idempotent.
    pub fn ignore(&mut self, receiver: ReceiverId, source: SourceId) {
        self.ignore.entry(receiver).or_default().insert(source);
    }

    #[inline]
    pub fn is_ignored(&self, receiver: ReceiverId, source: SourceId) -> bool {
        self.ignore.get(&receiver).map_or(false, |set| set.contains(&source))
    }

    /// Drop the receiver's whole ignore set.
    pub fn remove_receiver(&mut self, receiver: ReceiverId) {
        self.ignore.remove(&receiver);
    }

    /// Remove `source` from every receiver's set (source destroyed).
    pub fn forget_source(&mut self, source: SourceId) {
        self.ignore.retain(|_, set| {
            set.remove(&source);
            !set.is_empty()
        });
    }

    pub fn ignored_count(&self, receiver: ReceiverId) -> usize {
        self.ignore.get(&receiver).map_or(0, |s| s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test] fn ids_are_unique_and_nonzero() {
        let mut r = InteractionRegistry::new();
        let a = r.issue_source_id();
        let b = r.issue_receiver_id();
        let c = r.issue_source_id();
        assert!(a.is_assigned() && b.is_assigned());
        assert!(a.0 < b.0 && b.0 < c.0);
    }

    #[test] fn ignore_is_directional_and_idempotent() {
        let mut r = InteractionRegistry::new();
        let rx = ReceiverId(7);
        let src = SourceId(3);
        r.ignore(rx, src);
        r.ignore(rx, src);
        assert!(r.is_ignored(rx, src));
        assert_eq!(r.ignored_count(rx), 1);
        assert!(!r.is_ignored(ReceiverId(3), SourceId(7)));
        assert!(!r.is_ignored(ReceiverId(8), src));
    }

    #[test] fn removal_paths() {
        let mut r = InteractionRegistry::new();
        r.ignore(ReceiverId(1), SourceId(10));
        r.ignore(ReceiverId(1), SourceId(11));
        r.ignore(ReceiverId(2), SourceId(10));
        r.forget_source(SourceId(10));
        assert!(!r.is_ignored(ReceiverId(1), SourceId(10)));
        assert!(!r.is_ignored(ReceiverId(2), SourceId(10)));
        assert!(r.is_ignored(ReceiverId(1), SourceId(11)));
        r.remove_receiver(ReceiverId(1));
        assert_eq!(r.ignored_count(ReceiverId(1)), 0);
    }
}
