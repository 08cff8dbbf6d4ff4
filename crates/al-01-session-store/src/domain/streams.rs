//! The aggregate root of the session store.

use shared_types::{Stream, StreamId};
use std::collections::HashMap;

/// All live streams, remembering the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct Streams {
    map: HashMap<StreamId, Stream>,
    key_order: Vec<StreamId>,
}

impl Streams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: StreamId) -> Option<&Stream> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: StreamId) -> Option<&mut Stream> {
        self.map.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: StreamId) -> bool {
        self.map.contains_key(&id)
    }

    /// Insert or replace a stream. A new ID goes to the end of the order;
    /// a replaced one keeps its position.
    pub fn insert(&mut self, stream: Stream) -> Option<Stream> {
        let id = stream.id;
        let previous = self.map.insert(id, stream);
        if previous.is_none() {
            self.key_order.push(id);
        }
        previous
    }

    pub fn remove(&mut self, id: StreamId) -> Option<Stream> {
        let removed = self.map.remove(&id)?;
        self.key_order.retain(|k| *k != id);
        Some(removed)
    }

    /// Streams in insertion order.
    pub fn ordered(&self) -> impl Iterator<Item = &Stream> {
        self.key_order.iter().filter_map(|id| self.map.get(id))
    }

    #[must_use]
    pub fn ids(&self) -> &[StreamId] {
        &self.key_order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut streams = Streams::new();
        for id in [30, 10, 20] {
            streams.insert(Stream::new(id));
        }
        let ids: Vec<StreamId> = streams.ordered().map(|s| s.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut streams = Streams::new();
        streams.insert(Stream::new(1));
        streams.insert(Stream::new(2));

        let mut replacement = Stream::new(1);
        replacement.character_id = 5;
        assert!(streams.insert(replacement).is_some());

        assert_eq!(streams.ids(), &[1, 2]);
        assert_eq!(streams.get(1).map(|s| s.character_id), Some(5));
    }

    #[test]
    fn test_remove_drops_key_order() {
        let mut streams = Streams::new();
        streams.insert(Stream::new(1));
        streams.insert(Stream::new(2));

        assert!(streams.remove(1).is_some());
        assert!(streams.remove(1).is_none());
        assert_eq!(streams.ids(), &[2]);
        assert_eq!(streams.len(), 1);
    }
}
