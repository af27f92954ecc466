//! Interval-indexed AVL tree.
//!
//! The [`TimeTree`] maps candidate intervals to the events that may be
//! placed in them. Keys are compared by `(start, end)`; each node is
//! augmented with its subtree's maximum end and minimum start, which
//! bound the descent during stabbing queries.
//!
//! # Complexity
//!
//! - `insert` / `delete`: O(log n) per candidate interval
//! - `search`: O(log n)
//! - `overlap_search`: O(log n + k) where k is the number of hits

use std::cmp::Ordering;
use std::fmt::Write as _;

use crate::interval::TimeInterval;
use crate::model::Event;
use crate::Id;

pub mod error;
mod node;
pub mod sweep;

pub use error::TreeError;
pub use node::TimeTreeNode;
pub use sweep::OverlapPairs;

type Link = Option<Box<TimeTreeNode>>;

/// One overlap-query result: which event matched, and under which of its
/// candidate intervals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hit {
    pub event: Id,
    pub key: TimeInterval,
}

/// AVL tree of candidate intervals, each holding the ids of the events
/// inserted under that key. An event appears once per candidate interval
/// of its task; `size` counts distinct keys.
#[derive(Debug, Clone, Default)]
pub struct TimeTree {
    root: Link,
    size: usize,
}

impl TimeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct interval keys.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Indexes `event` under every candidate interval of its task.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotTemporal`] if the event's task carries no
    /// placement intervals.
    pub fn insert(&mut self, event: &Event) -> Result<(), TreeError> {
        let Some(temporal) = event.as_temporal() else {
            return Err(TreeError::NotTemporal {
                title: event.task().title().to_string(),
            });
        };
        for &key in temporal.schedule_intervals().iter() {
            let root = self.root.take();
            self.root = Some(insert_rec(root, key, event.id(), &mut self.size));
        }
        Ok(())
    }

    /// Removes `event` from every candidate key it was inserted under.
    /// A node whose event list empties is spliced out of the tree.
    ///
    /// All keys are validated before any mutation, so a failed delete
    /// leaves the tree untouched.
    pub fn delete(&mut self, event: &Event) -> Result<(), TreeError> {
        let Some(temporal) = event.as_temporal() else {
            return Err(TreeError::NotTemporal {
                title: event.task().title().to_string(),
            });
        };
        for &key in temporal.schedule_intervals().iter() {
            let node = self.search(key)?;
            if !node.contains(event.id()) {
                return Err(TreeError::EventNotFound {
                    event: event.id().to_string(),
                });
            }
        }
        for &key in temporal.schedule_intervals().iter() {
            self.root = delete_rec(self.root.take(), key, event.id(), &mut self.size);
        }
        Ok(())
    }

    /// Exact-key lookup.
    pub fn search(&self, key: TimeInterval) -> Result<&TimeTreeNode, TreeError> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return Ok(node),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        Err(TreeError::KeyNotFound { key })
    }

    /// Stabbing query: every `(event, key)` record whose key overlaps
    /// `query`. Descends left when the left subtree's `max_end` reaches
    /// the query start, right when the right subtree's `min_start` stays
    /// within the query end.
    pub fn overlap_search(&self, query: TimeInterval) -> Vec<Hit> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            collect_overlaps(root, query, &mut hits);
        }
        hits
    }

    /// Overlap query followed by the sweep-line pairwise extraction.
    pub fn sweepline_overlap_search(&self, query: TimeInterval) -> OverlapPairs {
        sweep::pair_overlaps(&self.overlap_search(query))
    }

    /// In-order `(key, event count)` listing.
    pub fn inorder(&self) -> Vec<(TimeInterval, usize)> {
        let mut out = Vec::with_capacity(self.size);
        if let Some(root) = &self.root {
            inorder_rec(root, &mut out);
        }
        out
    }

    /// Box-drawing dump of the tree shape, for diagnostics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            render_rec(root, "", false, &mut out);
        }
        out
    }
}

// ─────────────────────────────────────────────────────────────────────
// Rotations and rebalancing
// ─────────────────────────────────────────────────────────────────────

fn rotate_left(mut node: Box<TimeTreeNode>) -> Box<TimeTreeNode> {
    match node.right.take() {
        Some(mut child) => {
            node.right = child.left.take();
            node.update();
            child.left = Some(node);
            child.update();
            child
        }
        // Only requested when a right child exists; degrade to a no-op.
        None => {
            node.update();
            node
        }
    }
}

fn rotate_right(mut node: Box<TimeTreeNode>) -> Box<TimeTreeNode> {
    match node.left.take() {
        Some(mut child) => {
            node.left = child.right.take();
            node.update();
            child.right = Some(node);
            child.update();
            child
        }
        None => {
            node.update();
            node
        }
    }
}

/// Refreshes aggregates and restores the AVL balance factor to
/// {-1, 0, +1} with at most two rotations.
fn rebalance(mut node: Box<TimeTreeNode>) -> Box<TimeTreeNode> {
    node.update();
    let balance = node.balance();
    if balance > 1 {
        if node.left.as_ref().map_or(0, |left| left.balance()) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if balance < -1 {
        if node.right.as_ref().map_or(0, |right| right.balance()) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

// ─────────────────────────────────────────────────────────────────────
// Recursive operations
// ─────────────────────────────────────────────────────────────────────

fn insert_rec(link: Link, key: TimeInterval, event: &str, size: &mut usize) -> Box<TimeTreeNode> {
    let mut node = match link {
        None => {
            *size += 1;
            return TimeTreeNode::new(key, event.to_string());
        }
        Some(node) => node,
    };
    match key.cmp(&node.key) {
        Ordering::Less => {
            node.left = Some(insert_rec(node.left.take(), key, event, size));
        }
        Ordering::Greater => {
            node.right = Some(insert_rec(node.right.take(), key, event, size));
        }
        Ordering::Equal => {
            // Existing key: the node accumulates the event.
            node.events.push(event.to_string());
            return node;
        }
    }
    rebalance(node)
}

fn delete_rec(link: Link, key: TimeInterval, event: &str, size: &mut usize) -> Link {
    let mut node = link?;
    match key.cmp(&node.key) {
        Ordering::Less => {
            node.left = delete_rec(node.left.take(), key, event, size);
        }
        Ordering::Greater => {
            node.right = delete_rec(node.right.take(), key, event, size);
        }
        Ordering::Equal => {
            if let Some(position) = node.events.iter().position(|id| id == event) {
                node.events.remove(position);
            }
            if node.events.is_empty() {
                *size -= 1;
                match (node.left.take(), node.right.take()) {
                    (None, None) => return None,
                    (Some(child), None) | (None, Some(child)) => return Some(child),
                    (Some(left), Some(right)) => {
                        // Two children: splice in the in-order successor.
                        let (successor_key, successor_events, right) = take_min(right);
                        node.key = successor_key;
                        node.events = successor_events;
                        node.left = Some(left);
                        node.right = right;
                    }
                }
            }
        }
    }
    Some(rebalance(node))
}

/// Detaches the minimum node of a subtree, returning its key, its event
/// list, and the rebalanced remainder.
fn take_min(mut node: Box<TimeTreeNode>) -> (TimeInterval, Vec<Id>, Link) {
    match node.left.take() {
        None => {
            let detached = *node;
            (detached.key, detached.events, detached.right)
        }
        Some(left) => {
            let (key, events, remainder) = take_min(left);
            node.left = remainder;
            (key, events, Some(rebalance(node)))
        }
    }
}

fn collect_overlaps(node: &TimeTreeNode, query: TimeInterval, hits: &mut Vec<Hit>) {
    if node.key.overlaps(&query) {
        hits.extend(node.events.iter().map(|event| Hit {
            event: event.clone(),
            key: node.key,
        }));
    }
    if let Some(left) = &node.left {
        if left.max_end >= query.start() {
            collect_overlaps(left, query, hits);
        }
    }
    if let Some(right) = &node.right {
        if right.min_start <= query.end() {
            collect_overlaps(right, query, hits);
        }
    }
}

fn inorder_rec(node: &TimeTreeNode, out: &mut Vec<(TimeInterval, usize)>) {
    if let Some(left) = &node.left {
        inorder_rec(left, out);
    }
    out.push((node.key, node.events.len()));
    if let Some(right) = &node.right {
        inorder_rec(right, out);
    }
}

fn render_rec(node: &TimeTreeNode, prefix: &str, is_left: bool, out: &mut String) {
    let connector = if is_left { "├── " } else { "└── " };
    let _ = writeln!(
        out,
        "{prefix}{connector}{} ({} events)",
        node.key,
        node.events.len()
    );
    let child_prefix = format!("{prefix}{}", if is_left { "│   " } else { "    " });
    if let Some(left) = &node.left {
        render_rec(left, &child_prefix, true, out);
    }
    if let Some(right) = &node.right {
        render_rec(right, &child_prefix, false, out);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
impl TimeTree {
    /// Asserts the BST order, AVL balance, and aggregate invariants over
    /// the whole tree.
    pub(crate) fn audit(&self) {
        fn check(node: &TimeTreeNode) {
            let mut expected_max = node.key.end();
            let mut expected_min = node.key.start();
            if let Some(left) = &node.left {
                check(left);
                expected_max = expected_max.max(left.max_end);
                expected_min = expected_min.min(left.min_start);
            }
            if let Some(right) = &node.right {
                check(right);
                expected_max = expected_max.max(right.max_end);
                expected_min = expected_min.min(right.min_start);
            }
            assert_eq!(
                node.height,
                1 + node.left_height().max(node.right_height()),
                "stale height at {}",
                node.key
            );
            assert!(
                node.balance().abs() <= 1,
                "AVL balance violated at {}",
                node.key
            );
            assert_eq!(node.max_end, expected_max, "stale max_end at {}", node.key);
            assert_eq!(node.min_start, expected_min, "stale min_start at {}", node.key);
            assert!(!node.events.is_empty(), "empty node survived at {}", node.key);
        }

        if let Some(root) = &self.root {
            check(root);
        }
        let keys: Vec<_> = self.inorder().into_iter().map(|(key, _)| key).collect();
        assert!(
            keys.windows(2).all(|pair| pair[0] < pair[1]),
            "in-order keys out of order"
        );
        assert_eq!(keys.len(), self.size, "size does not match distinct keys");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, Task, TaskKind};
    use crate::test_utils::{iv, temporal_event};

    #[test]
    fn insert_rejects_non_temporal_events() {
        let mut tree = TimeTree::new();
        let todo = Event::new(
            TaskKind::Todo(Task::new("todo", "", None).unwrap()),
            1.0,
            1.0,
            1.0,
            1.0,
        )
        .unwrap();
        assert!(matches!(
            tree.insert(&todo),
            Err(TreeError::NotTemporal { .. })
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn insert_indexes_each_candidate_interval() {
        let mut tree = TimeTree::new();
        let event = temporal_event("a", (7, 0), (7, 30), &[iv(9, 0, 10, 0), iv(11, 0, 12, 0)]);
        tree.insert(&event).unwrap();
        // Nominal slot plus the two disjoint candidates.
        assert_eq!(tree.size(), 3);
        tree.audit();
    }

    #[test]
    fn shared_key_accumulates_events() {
        let mut tree = TimeTree::new();
        let first = temporal_event("first", (9, 0), (10, 0), &[]);
        let second = temporal_event("second", (9, 0), (10, 0), &[]);
        tree.insert(&first).unwrap();
        tree.insert(&second).unwrap();
        assert_eq!(tree.size(), 1);
        let node = tree.search(iv(9, 0, 10, 0)).unwrap();
        assert_eq!(node.events(), &[first.id().to_string(), second.id().to_string()]);
    }

    #[test]
    fn delete_of_shared_key_keeps_the_node() {
        let mut tree = TimeTree::new();
        let first = temporal_event("first", (9, 0), (10, 0), &[]);
        let second = temporal_event("second", (9, 0), (10, 0), &[]);
        tree.insert(&first).unwrap();
        tree.insert(&second).unwrap();
        tree.delete(&first).unwrap();
        assert_eq!(tree.size(), 1);
        let node = tree.search(iv(9, 0, 10, 0)).unwrap();
        assert_eq!(node.events(), &[second.id().to_string()]);
        tree.audit();
    }

    #[test]
    fn insert_then_delete_restores_the_tree() {
        let mut tree = TimeTree::new();
        let resident = temporal_event("resident", (8, 0), (9, 0), &[iv(13, 0, 14, 0)]);
        tree.insert(&resident).unwrap();
        let before = tree.inorder();

        let visitor = temporal_event("visitor", (8, 30), (9, 30), &[iv(10, 0, 11, 0)]);
        tree.insert(&visitor).unwrap();
        tree.delete(&visitor).unwrap();

        assert_eq!(tree.inorder(), before);
        assert_eq!(tree.size(), 2);
        tree.audit();
    }

    #[test]
    fn delete_validates_before_mutating() {
        let mut tree = TimeTree::new();
        let resident = temporal_event("resident", (8, 0), (9, 0), &[]);
        tree.insert(&resident).unwrap();

        let stranger = temporal_event("stranger", (8, 0), (9, 0), &[iv(10, 0, 11, 0)]);
        // Shares the 8-9 key but its second candidate is absent: the
        // delete must fail without touching the resident.
        assert!(tree.delete(&stranger).is_err());
        assert_eq!(tree.size(), 1);
        assert!(tree.search(iv(8, 0, 9, 0)).unwrap().contains(resident.id()));
    }

    #[test]
    fn search_miss_reports_key_not_found() {
        let tree = TimeTree::new();
        assert!(matches!(
            tree.search(iv(9, 0, 10, 0)),
            Err(TreeError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn overlap_search_finds_exactly_the_overlapping_keys() {
        let mut tree = TimeTree::new();
        let events = [
            temporal_event("e13", (1, 0), (3, 0), &[]),
            temporal_event("e24", (2, 0), (4, 0), &[]),
            temporal_event("e56", (5, 0), (6, 0), &[]),
            temporal_event("e79", (7, 0), (9, 0), &[]),
        ];
        for event in &events {
            tree.insert(event).unwrap();
        }
        tree.audit();

        let mut keys: Vec<_> = tree
            .overlap_search(iv(3, 0, 5, 0))
            .into_iter()
            .map(|hit| hit.key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec![iv(1, 0, 3, 0), iv(2, 0, 4, 0), iv(5, 0, 6, 0)]);
    }

    #[test]
    fn overlap_search_reports_which_candidate_matched() {
        let mut tree = TimeTree::new();
        let event = temporal_event("a", (7, 0), (7, 30), &[iv(9, 0, 10, 0)]);
        tree.insert(&event).unwrap();

        let hits = tree.overlap_search(iv(9, 30, 11, 0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].event, event.id());
        assert_eq!(hits[0].key, iv(9, 0, 10, 0));
    }

    #[test]
    fn rotations_keep_aggregates_fresh() {
        let mut tree = TimeTree::new();
        // Ascending inserts force left rotations; descending candidates
        // force right rotations on the way back.
        let mut events = Vec::new();
        for hour in 1..=12 {
            let event = temporal_event("t", (hour, 0), (hour, 30), &[]);
            tree.insert(&event).unwrap();
            tree.audit();
            events.push(event);
        }
        assert_eq!(tree.size(), 12);

        for event in &events {
            tree.delete(event).unwrap();
            tree.audit();
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn render_lists_every_key() {
        let mut tree = TimeTree::new();
        for hour in [9, 7, 11] {
            tree.insert(&temporal_event("t", (hour, 0), (hour, 30), &[]))
                .unwrap();
        }
        let rendered = tree.render();
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.contains("└── "));
    }
}
