//! agendum - personal scheduling core
//!
//! A constraint-based engine that assigns time-bounded events with flexible
//! placement windows to concrete, non-overlapping slots. The pipeline:
//! an interval-indexed AVL tree answers day-window stabbing queries, a
//! sweep-line pass derives pairwise overlap relations between candidate
//! placements, and a binary CSP solver (AC-3 plus backtracking with
//! interval splitting) produces the conflict-free schedule.

pub mod calendar;
pub mod csp;
pub mod interval;
pub mod model;
pub mod tree;

pub use calendar::Calendar;
pub use interval::{IntervalSet, TimeInterval};
pub use model::{Event, Task, TaskKind, TemporalTask};
pub use tree::TimeTree;

/// Identifier type used for events and scheduling artifacts.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_utils;
