//! Scheduling event: a task plus its four priority-component weights.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::WeightError;
use super::task::TaskKind;
use super::temporal::TemporalTask;
use crate::interval::{IntervalSet, TimeInterval};
use crate::{generate_id, Id};

/// Upper bound of each weight component (100 split across 4 components).
pub const MAX_WEIGHT: f64 = 25.0;

// Urgency curve m * tanh(dt/d + s) + m, dt in hours. The shift and scale
// put an event ending right now at roughly 90 and an event two days out
// near 10, saturating at 100 once the end time is well past.
const URGENCY_SCALE: f64 = 50.0;
const URGENCY_DAMPING_HOURS: f64 = 23.440_65;
const URGENCY_SHIFT: f64 = 1.098_612_288_67;

/// One scheduling request: a task weighted along the goal, routine,
/// personal, and relational dimensions.
///
/// The scalar [`priority`](Self::priority) is used only for tie-breaking
/// and ordering (todo queues, diagnostics); the CSP never consults it for
/// correctness. Logical identity is the task plus the weights; the
/// generated [`id`](Self::id) is the storage handle the calendar, tree,
/// and solver pass around.
#[derive(Debug, Clone)]
pub struct Event {
    id: Id,
    task: TaskKind,
    goal_value: f64,
    routine_value: f64,
    personal_value: f64,
    relational_value: f64,
}

impl Event {
    /// Builds an event, validating each weight against `[0, 25]`.
    pub fn new(
        task: TaskKind,
        goal_value: f64,
        routine_value: f64,
        personal_value: f64,
        relational_value: f64,
    ) -> Result<Self, WeightError> {
        for value in [goal_value, routine_value, personal_value, relational_value] {
            if !(0.0..=MAX_WEIGHT).contains(&value) {
                return Err(WeightError::OutOfRange { value });
            }
        }
        Ok(Self {
            id: generate_id(),
            task,
            goal_value,
            routine_value,
            personal_value,
            relational_value,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task(&self) -> &TaskKind {
        &self.task
    }

    pub fn goal_value(&self) -> f64 {
        self.goal_value
    }

    pub fn routine_value(&self) -> f64 {
        self.routine_value
    }

    pub fn personal_value(&self) -> f64 {
        self.personal_value
    }

    pub fn relational_value(&self) -> f64 {
        self.relational_value
    }

    // ── Temporal capability pass-throughs ────────────────────────────

    pub fn as_temporal(&self) -> Option<&TemporalTask> {
        self.task.as_temporal()
    }

    pub fn duration(&self) -> Option<TimeDelta> {
        self.task.duration()
    }

    pub fn time_slot(&self) -> Option<TimeInterval> {
        self.task.time_slot()
    }

    pub fn schedule_intervals(&self) -> Option<&IntervalSet> {
        self.task.schedule_intervals()
    }

    // ── Priority ─────────────────────────────────────────────────────

    /// Semantic score in `[0, 100]`: the capped sum of the four weights.
    pub fn semantic(&self) -> f64 {
        (self.goal_value + self.routine_value + self.personal_value + self.relational_value)
            .min(100.0)
    }

    /// Urgency score in `(0, 100)` relative to `now`.
    ///
    /// The reference instant is the nominal end for temporal tasks and the
    /// deadline for deadline-only todos; an undated todo pins the time
    /// difference at zero and scores the curve midpoint-plus-shift
    /// (about 90).
    pub fn urgency(&self, now: DateTime<Utc>) -> f64 {
        let reference = match &self.task {
            TaskKind::Temporal(temporal) => Some(temporal.end()),
            TaskKind::Todo(task) => task.deadline(),
        };
        let hours = reference.map_or(0.0, |instant| {
            (now - instant).num_seconds() as f64 / 3600.0
        });
        URGENCY_SCALE * (hours / URGENCY_DAMPING_HOURS + URGENCY_SHIFT).tanh() + URGENCY_SCALE
    }

    /// Scalar priority: `urgency(now) * semantic()`.
    pub fn priority(&self, now: DateTime<Utc>) -> f64 {
        self.urgency(now) * self.semantic()
    }
}

/// Logical identity: same task, same weights. The generated id is a
/// storage handle and does not participate.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.task == other.task
            && self.goal_value == other.goal_value
            && self.routine_value == other.routine_value
            && self.personal_value == other.personal_value
            && self.relational_value == other.relational_value
    }
}
