//! AC-3 arc-consistency propagation.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

use super::{fits, Csp, CspError};
use crate::interval::TimeInterval;

impl Csp {
    /// Runs AC-3 to a fixed point, building the support tables and
    /// removing every domain value with no compatible partner across some
    /// arc.
    ///
    /// Support tables are rebuilt from scratch on each call, so running
    /// propagation twice yields the same domains.
    ///
    /// # Errors
    ///
    /// Returns [`CspError::EmptyDomain`] with the offending event when a
    /// domain is wiped out: the problem is infeasible as posed.
    pub fn propagate(&mut self) -> Result<(), CspError> {
        self.support.clear();

        let mut queue: VecDeque<(NodeIndex, NodeIndex)> = VecDeque::new();
        let endpoints: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .collect();
        for (a, b) in endpoints {
            queue.push_back((a, b));
            queue.push_back((b, a));
        }
        debug!(arcs = queue.len(), "starting arc-consistency propagation");

        while let Some((x, y)) = queue.pop_front() {
            let dx = self.durations[x.index()];
            let dy = self.durations[y.index()];

            // Walk snapshots: revision can shrink either domain while the
            // arc is being processed.
            let x_values = self.domains[x.index()].clone();
            for value in x_values {
                if !self.domains[x.index()].contains(&value) {
                    continue;
                }
                let mut supported = false;
                let y_values = self.domains[y.index()].clone();
                for partner in y_values {
                    if fits(value, partner, dx, dy) {
                        self.support
                            .entry((x, y))
                            .or_default()
                            .entry(value)
                            .or_default()
                            .insert(partner);
                        self.support
                            .entry((y, x))
                            .or_default()
                            .entry(partner)
                            .or_default()
                            .insert(value);
                        supported = true;
                    }
                }
                if !supported {
                    self.revise(x, y, value, &mut queue)?;
                }
            }
        }

        self.propagated = true;
        Ok(())
    }

    /// Removes `value` from `x`'s domain and propagates the loss: every
    /// other neighbor `z` gets its arc re-enqueued, its back references
    /// to `value` pruned, and any of its values left without support is
    /// revised recursively.
    fn revise(
        &mut self,
        x: NodeIndex,
        skip: NodeIndex,
        value: TimeInterval,
        queue: &mut VecDeque<(NodeIndex, NodeIndex)>,
    ) -> Result<(), CspError> {
        if let Some(position) = self.domains[x.index()].iter().position(|v| *v == value) {
            self.domains[x.index()].remove(position);
            trace!(event = %self.id_of(x), %value, "pruned unsupported candidate");
        }
        if self.domains[x.index()].is_empty() {
            debug!(event = %self.id_of(x), "domain wiped out");
            return Err(CspError::EmptyDomain(self.id_of(x).clone()));
        }

        let neighbors: Vec<NodeIndex> = self.graph.neighbors(x).collect();
        for z in neighbors {
            if z == skip {
                continue;
            }
            if !queue.contains(&(z, x)) {
                queue.push_back((z, x));
            }

            // Partners of the removed value in z lose one support each;
            // a partner losing its last support is revised in turn.
            let partners: Vec<TimeInterval> = self
                .support
                .get(&(x, z))
                .and_then(|table| table.get(&value))
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            for partner in partners {
                let mut last_support_gone = false;
                if let Some(back) = self
                    .support
                    .get_mut(&(z, x))
                    .and_then(|table| table.get_mut(&partner))
                {
                    back.remove(&value);
                    last_support_gone = back.is_empty();
                }
                if last_support_gone {
                    if let Some(table) = self.support.get_mut(&(z, x)) {
                        table.remove(&partner);
                    }
                    self.revise(z, x, partner, queue)?;
                }
            }
            if let Some(table) = self.support.get_mut(&(x, z)) {
                table.remove(&value);
            }
        }
        Ok(())
    }
}
