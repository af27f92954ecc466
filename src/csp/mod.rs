//! Binary constraint-satisfaction solver over event placements.
//!
//! Variables are events, domains are their candidate intervals, and the
//! single binary constraint is *schedulability*: two events connected by
//! an arc must hold candidate intervals whose union can host both
//! durations without overlap (the `fits` predicate). Arcs come from the
//! sweep-line pass over a day window.
//!
//! Solving runs in two phases:
//!
//! 1. **AC-3** ([`propagate`](Csp::propagate)) removes every domain value
//!    with no compatible partner in a neighbor's domain, propagating
//!    removals until a fixed point (or a wipeout, which is reported as
//!    infeasible with the offending event).
//! 2. **Backtracking with interval splitting**
//!    ([`solve`](Csp::solve)) assigns candidate intervals in order.
//!    Because a candidate can be wider than the task it hosts, assigning
//!    one does not fix an instant; when a new assignment overlaps an
//!    earlier one, both are narrowed through `split` so that each range
//!    still admits its duration, and every change is recorded on an undo
//!    stack for rollback.
//!
//! The constraint graph is a petgraph [`UnGraph`]; node weights are the
//! event ids and `NodeIndex` is the internal variable handle.

use std::collections::{HashMap, HashSet};

use chrono::TimeDelta;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::interval::TimeInterval;
use crate::Id;

pub mod error;
mod fit;
mod propagate;
mod search;
mod split;

pub use error::CspError;

pub(crate) use fit::fits;
pub(crate) use split::split;

/// Per-arc support table: for each value of the source variable, the set
/// of target-variable values it is compatible with.
type SupportTable = HashMap<TimeInterval, HashSet<TimeInterval>>;

/// The scheduling CSP: variables, domains, arcs, and solver state.
#[derive(Debug, Default)]
pub struct Csp {
    graph: UnGraph<Id, ()>,
    node_by_id: HashMap<Id, NodeIndex>,
    /// Indexed by `NodeIndex::index()`; nodes are never removed.
    durations: Vec<TimeDelta>,
    domains: Vec<Vec<TimeInterval>>,
    support: HashMap<(NodeIndex, NodeIndex), SupportTable>,
    assignments: HashMap<NodeIndex, TimeInterval>,
    undo_stack: Vec<(NodeIndex, Option<TimeInterval>)>,
    propagated: bool,
}

impl Csp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Adds an event as a variable with its duration and candidate
    /// domain. The domain is sorted ascending and deduplicated, which
    /// fixes the value ordering of the search.
    pub fn add_event(
        &mut self,
        id: Id,
        duration: TimeDelta,
        mut domain: Vec<TimeInterval>,
    ) -> Result<NodeIndex, CspError> {
        if self.node_by_id.contains_key(&id) {
            return Err(CspError::DuplicateEvent(id));
        }
        domain.sort();
        domain.dedup();
        let node = self.graph.add_node(id.clone());
        self.node_by_id.insert(id, node);
        self.durations.push(duration);
        self.domains.push(domain);
        Ok(node)
    }

    /// Connects two events with the schedulability constraint. Adding the
    /// same arc twice, in either orientation, is a no-op.
    pub fn add_arc(&mut self, first: &str, second: &str) -> Result<(), CspError> {
        let a = self.node_of(first)?;
        let b = self.node_of(second)?;
        if a != b && !self.graph.contains_edge(a, b) {
            self.graph.add_edge(a, b, ());
        }
        Ok(())
    }

    /// The current domain of an event, shrinking as propagation and
    /// search prune it.
    pub fn domain(&self, id: &str) -> Result<&[TimeInterval], CspError> {
        let node = self.node_of(id)?;
        Ok(&self.domains[node.index()])
    }

    fn node_of(&self, id: &str) -> Result<NodeIndex, CspError> {
        self.node_by_id
            .get(id)
            .copied()
            .ok_or_else(|| CspError::UnknownEvent(id.to_string()))
    }

    fn id_of(&self, node: NodeIndex) -> &Id {
        &self.graph[node]
    }
}
