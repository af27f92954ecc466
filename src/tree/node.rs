//! Augmented AVL node: one candidate-interval key, the events that share
//! it, and the subtree aggregates that drive overlap pruning.

use chrono::{DateTime, Utc};

use super::error::TreeError;
use crate::interval::TimeInterval;
use crate::Id;

/// A node of the [`TimeTree`](super::TimeTree).
///
/// The key is a candidate interval; `events` lists every event inserted
/// under that exact key, in insertion order. `max_end` and `min_start`
/// aggregate the whole subtree and are recomputed on every structural
/// change, including rotations.
#[derive(Debug, Clone)]
pub struct TimeTreeNode {
    pub(crate) key: TimeInterval,
    pub(crate) events: Vec<Id>,
    pub(crate) max_end: DateTime<Utc>,
    pub(crate) min_start: DateTime<Utc>,
    pub(crate) height: u32,
    pub(crate) left: Option<Box<TimeTreeNode>>,
    pub(crate) right: Option<Box<TimeTreeNode>>,
}

impl TimeTreeNode {
    pub(crate) fn new(key: TimeInterval, event: Id) -> Box<Self> {
        Box::new(Self {
            key,
            events: vec![event],
            max_end: key.end(),
            min_start: key.start(),
            height: 1,
            left: None,
            right: None,
        })
    }

    /// Recomputes height and both subtree aggregates from the key and the
    /// children.
    pub(crate) fn update(&mut self) {
        self.height = 1 + self.left_height().max(self.right_height());
        self.max_end = self.key.end();
        self.min_start = self.key.start();
        if let Some(left) = &self.left {
            self.max_end = self.max_end.max(left.max_end);
            self.min_start = self.min_start.min(left.min_start);
        }
        if let Some(right) = &self.right {
            self.max_end = self.max_end.max(right.max_end);
            self.min_start = self.min_start.min(right.min_start);
        }
    }

    pub(crate) fn left_height(&self) -> u32 {
        self.left.as_ref().map_or(0, |n| n.height)
    }

    pub(crate) fn right_height(&self) -> u32 {
        self.right.as_ref().map_or(0, |n| n.height)
    }

    /// Balance factor `height(left) - height(right)`.
    pub(crate) fn balance(&self) -> i32 {
        self.left_height() as i32 - self.right_height() as i32
    }

    // ── Public surface ───────────────────────────────────────────────

    /// The candidate interval this node indexes.
    pub fn key(&self) -> TimeInterval {
        self.key
    }

    /// Ids of the events sharing this key, in insertion order.
    pub fn events(&self) -> &[Id] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event id at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::IndexOutOfRange`] for an invalid position.
    pub fn event_at(&self, index: usize) -> Result<&str, TreeError> {
        self.events
            .get(index)
            .map(Id::as_str)
            .ok_or(TreeError::IndexOutOfRange {
                index,
                len: self.events.len(),
            })
    }

    /// Returns true if the node holds the given event id.
    pub fn contains(&self, event: &str) -> bool {
        self.events.iter().any(|id| id == event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::iv;

    #[test]
    fn fresh_node_aggregates_its_own_key() {
        let node = TimeTreeNode::new(iv(9, 0, 10, 0), "a".to_string());
        assert_eq!(node.max_end, iv(9, 0, 10, 0).end());
        assert_eq!(node.min_start, iv(9, 0, 10, 0).start());
        assert_eq!(node.height, 1);
        assert_eq!(node.balance(), 0);
    }

    #[test]
    fn event_at_checks_bounds() {
        let node = TimeTreeNode::new(iv(9, 0, 10, 0), "a".to_string());
        assert_eq!(node.event_at(0).unwrap(), "a");
        assert_eq!(
            node.event_at(1).unwrap_err(),
            TreeError::IndexOutOfRange { index: 1, len: 1 }
        );
    }
}
