//! Plain task and the task capability sum consumed by the scheduler.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::TaskError;
use super::temporal::TemporalTask;
use crate::interval::{IntervalSet, TimeInterval, WindowError};

/// A unit of work: a title, a description, completion state, and an
/// optional deadline.
///
/// `completed` is monotonic: it can only move from `false` to `true`
/// through [`set_completed`](Self::set_completed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    title: String,
    description: String,
    completed: bool,
    deadline: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new, not-yet-completed task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::EmptyTitle`] if `title` is empty or whitespace.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        Ok(Self {
            title,
            description: description.into(),
            completed: false,
            deadline,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Marks the task as done. There is no way back.
    pub fn set_completed(&mut self) {
        self.completed = true;
    }
}

/// The capability sum the scheduler works over: a plain todo, or a task
/// with a nominal placement and candidate intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Todo(Task),
    Temporal(TemporalTask),
}

impl TaskKind {
    /// The underlying base task.
    pub fn task(&self) -> &Task {
        match self {
            TaskKind::Todo(task) => task,
            TaskKind::Temporal(temporal) => temporal.task(),
        }
    }

    pub fn title(&self) -> &str {
        self.task().title()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.task().deadline()
    }

    pub fn is_completed(&self) -> bool {
        self.task().is_completed()
    }

    pub fn set_completed(&mut self) {
        match self {
            TaskKind::Todo(task) => task.set_completed(),
            TaskKind::Temporal(temporal) => temporal.set_completed(),
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, TaskKind::Temporal(_))
    }

    pub fn as_temporal(&self) -> Option<&TemporalTask> {
        match self {
            TaskKind::Temporal(temporal) => Some(temporal),
            TaskKind::Todo(_) => None,
        }
    }

    /// The nominal duration, when the task has one.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.as_temporal().map(TemporalTask::duration)
    }

    /// The nominal placement slot, when the task has one.
    pub fn time_slot(&self) -> Option<TimeInterval> {
        self.as_temporal().map(TemporalTask::time_slot)
    }

    /// The candidate placement intervals, when the task has any.
    pub fn schedule_intervals(&self) -> Option<&IntervalSet> {
        self.as_temporal().map(TemporalTask::schedule_intervals)
    }

    /// Adds a candidate placement interval to a temporal task.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::OutsideWindow`] for a plain todo as well: a
    /// todo has no placement window at all.
    pub fn add_schedule_interval(&mut self, interval: TimeInterval) -> Result<(), WindowError> {
        match self {
            TaskKind::Temporal(temporal) => temporal.add_schedule_interval(interval),
            TaskKind::Todo(_) => Err(WindowError::OutsideWindow { interval }),
        }
    }
}

impl From<Task> for TaskKind {
    fn from(task: Task) -> Self {
        TaskKind::Todo(task)
    }
}

impl From<TemporalTask> for TaskKind {
    fn from(temporal: TemporalTask) -> Self {
        TaskKind::Temporal(temporal)
    }
}
