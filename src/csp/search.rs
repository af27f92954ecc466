//! Backtracking search with interval splitting and an undo log.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

use super::{fits, split, Csp, CspError};
use crate::interval::TimeInterval;
use crate::Id;

impl Csp {
    /// Propagates (if not already done) and searches for a complete
    /// assignment.
    ///
    /// Variables are tried in insertion order, values in ascending domain
    /// order, so the result is deterministic for a given construction
    /// sequence.
    ///
    /// # Errors
    ///
    /// - [`CspError::EmptyDomain`] if propagation wipes a domain out.
    /// - [`CspError::Exhausted`] if the search exhausts every assignment.
    pub fn solve(&mut self) -> Result<HashMap<Id, TimeInterval>, CspError> {
        if !self.propagated {
            self.propagate()?;
        }
        debug!(variables = self.len(), "starting backtracking search");
        if self.backtrack() {
            let solution = self
                .assignments
                .iter()
                .map(|(&node, &interval)| (self.id_of(node).clone(), interval))
                .collect();
            debug!("search succeeded");
            Ok(solution)
        } else {
            debug!("search exhausted every assignment");
            Err(CspError::Exhausted)
        }
    }

    fn first_unassigned(&self) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|node| !self.assignments.contains_key(node))
    }

    fn backtrack(&mut self) -> bool {
        let Some(variable) = self.first_unassigned() else {
            return true;
        };
        let values = self.domains[variable.index()].clone();
        for value in values {
            let checkpoint = self.undo_stack.len();
            if self.assign(variable, value) && self.backtrack() {
                return true;
            }
            self.undo(checkpoint);
        }
        false
    }

    /// Assigns `value` to `variable`, narrowing it and every already
    /// assigned overlapping neighbor through interval splitting.
    ///
    /// Narrowing a neighbor can invalidate that neighbor's fit with a
    /// *third* assignment, so after splitting, every changed interval is
    /// re-verified against all of its assigned neighbors; the assignment
    /// is abandoned if any pair stops fitting.
    ///
    /// On success, narrowed neighbors are logged with their previous
    /// assignment and the fresh assignment with `None`, so
    /// [`undo`](Self::undo) can restore both kinds. On failure all state
    /// is left untouched.
    fn assign(&mut self, variable: NodeIndex, value: TimeInterval) -> bool {
        let duration = self.durations[variable.index()];
        let mut narrowed_value = value;
        let mut narrowed_neighbors: Vec<(NodeIndex, TimeInterval, TimeInterval)> = Vec::new();

        for neighbor in self.graph.neighbors(variable) {
            let Some(&assigned) = self.assignments.get(&neighbor) else {
                continue;
            };
            if !assigned.overlaps(&narrowed_value) {
                continue;
            }
            match split(
                assigned,
                narrowed_value,
                self.durations[neighbor.index()],
                duration,
            ) {
                Some((neighbor_interval, own_interval)) => {
                    narrowed_value = own_interval;
                    narrowed_neighbors.push((neighbor, assigned, neighbor_interval));
                }
                None => {
                    trace!(
                        event = %self.id_of(variable),
                        %value,
                        blocker = %self.id_of(neighbor),
                        "assignment cannot be split against neighbor"
                    );
                    return false;
                }
            }
        }

        let mut updated: HashMap<NodeIndex, TimeInterval> = narrowed_neighbors
            .iter()
            .map(|&(neighbor, _, next)| (neighbor, next))
            .collect();
        updated.insert(variable, narrowed_value);
        if !self.changes_fit(&updated) {
            return false;
        }

        for (neighbor, previous, next) in narrowed_neighbors {
            self.undo_stack.push((neighbor, Some(previous)));
            self.assignments.insert(neighbor, next);
        }
        self.undo_stack.push((variable, None));
        self.assignments.insert(variable, narrowed_value);
        trace!(event = %self.id_of(variable), interval = %narrowed_value, "assigned");
        true
    }

    /// Checks every changed interval against all assigned arc-neighbors,
    /// reading changed values from `updated` and unchanged ones from the
    /// current assignments.
    fn changes_fit(&self, updated: &HashMap<NodeIndex, TimeInterval>) -> bool {
        for (&node, &interval) in updated {
            for other in self.graph.neighbors(node) {
                let other_interval = updated
                    .get(&other)
                    .or_else(|| self.assignments.get(&other));
                let Some(&other_interval) = other_interval else {
                    continue;
                };
                if !fits(
                    interval,
                    other_interval,
                    self.durations[node.index()],
                    self.durations[other.index()],
                ) {
                    trace!(
                        event = %self.id_of(node),
                        neighbor = %self.id_of(other),
                        "split result no longer fits a prior assignment"
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Rolls the undo stack back to `checkpoint`: `None` entries delete
    /// the assignment, `Some` entries restore the previous interval.
    fn undo(&mut self, checkpoint: usize) {
        while self.undo_stack.len() > checkpoint {
            if let Some((variable, previous)) = self.undo_stack.pop() {
                match previous {
                    Some(interval) => {
                        self.assignments.insert(variable, interval);
                    }
                    None => {
                        self.assignments.remove(&variable);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::fits;
    use crate::test_utils::iv;
    use chrono::TimeDelta;

    fn minutes(m: i64) -> TimeDelta {
        TimeDelta::minutes(m)
    }

    #[test]
    fn independent_events_are_assigned_directly() {
        let mut csp = Csp::new();
        csp.add_event("a".into(), minutes(60), vec![iv(9, 0, 10, 0)])
            .unwrap();
        csp.add_event("b".into(), minutes(60), vec![iv(11, 0, 12, 0)])
            .unwrap();

        let solution = csp.solve().unwrap();
        assert_eq!(solution["a"], iv(9, 0, 10, 0));
        assert_eq!(solution["b"], iv(11, 0, 12, 0));
    }

    #[test]
    fn overlapping_events_are_split_apart() {
        let mut csp = Csp::new();
        csp.add_event("a".into(), minutes(30), vec![iv(7, 0, 8, 0)])
            .unwrap();
        csp.add_event("b".into(), minutes(30), vec![iv(7, 0, 8, 0)])
            .unwrap();
        csp.add_arc("a", "b").unwrap();

        let solution = csp.solve().unwrap();
        assert!(fits(solution["a"], solution["b"], minutes(30), minutes(30)));
        assert!(solution["a"].duration() >= minutes(30));
        assert!(solution["b"].duration() >= minutes(30));
    }

    #[test]
    fn search_backtracks_over_blocked_values() {
        let mut csp = Csp::new();
        // Three 30-minute events; a's early candidate leaves b and c
        // unable to share the one-hour window, which only the search
        // (not propagation) detects. It must fall back to a's later
        // candidate.
        csp.add_event(
            "a".into(),
            minutes(30),
            vec![iv(7, 0, 8, 0), iv(9, 0, 10, 0)],
        )
        .unwrap();
        csp.add_event("b".into(), minutes(30), vec![iv(7, 0, 8, 0)])
            .unwrap();
        csp.add_event("c".into(), minutes(30), vec![iv(7, 0, 8, 0)])
            .unwrap();
        csp.add_arc("a", "b").unwrap();
        csp.add_arc("a", "c").unwrap();
        csp.add_arc("b", "c").unwrap();

        let solution = csp.solve().unwrap();
        assert_eq!(solution["a"], iv(9, 0, 10, 0));
        assert!(fits(solution["b"], solution["c"], minutes(30), minutes(30)));
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut csp = Csp::new();
        // Three 30-minute tasks into one 60-minute window: pairwise fits
        // hold, so propagation passes, but no global assignment exists.
        let window = iv(7, 0, 8, 0);
        for name in ["a", "b", "c"] {
            csp.add_event(name.into(), minutes(30), vec![window]).unwrap();
        }
        csp.add_arc("a", "b").unwrap();
        csp.add_arc("a", "c").unwrap();
        csp.add_arc("b", "c").unwrap();

        assert_eq!(csp.solve().unwrap_err(), CspError::Exhausted);
    }

    #[test]
    fn undo_restores_assignments_to_the_checkpoint() {
        let mut csp = Csp::new();
        let a = csp
            .add_event("a".into(), minutes(30), vec![iv(7, 0, 8, 0)])
            .unwrap();
        let b = csp
            .add_event("b".into(), minutes(30), vec![iv(7, 0, 8, 0)])
            .unwrap();
        csp.add_arc("a", "b").unwrap();

        assert!(csp.assign(a, iv(7, 0, 8, 0)));
        let checkpoint = csp.undo_stack.len();
        assert!(csp.assign(b, iv(7, 0, 8, 0)));
        // The split narrowed a; undoing must restore its full range.
        assert_ne!(csp.assignments[&a], iv(7, 0, 8, 0));
        csp.undo(checkpoint);
        assert_eq!(csp.assignments[&a], iv(7, 0, 8, 0));
        assert!(!csp.assignments.contains_key(&b));
    }
}
