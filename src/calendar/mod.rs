//! The owning facade: a time tree of temporal events plus the two todo
//! queues, and the day-schedule generation pipeline.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use tracing::debug;

use crate::csp::Csp;
use crate::interval::TimeInterval;
use crate::model::{Event, TaskKind};
use crate::tree::{sweep, Hit, TimeTree};
use crate::Id;

pub mod error;

pub use error::CalendarError;


/// Owns every scheduled event.
///
/// Temporal events are indexed in the [`TimeTree`] once per candidate
/// interval; deadline-only todos sit in a deadline-sorted queue; plain
/// todos keep insertion order. The registry maps event ids to the events
/// themselves, which is how tree hits and solver output are resolved.
///
/// # Example
///
/// ```
/// use agendum::{Calendar, TaskKind, TemporalTask};
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let mut calendar = Calendar::new();
/// let start = Utc.with_ymd_and_hms(2025, 10, 2, 9, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2025, 10, 2, 10, 0, 0).unwrap();
/// let task = TemporalTask::new("standup", "daily sync", start, end, None, None, None).unwrap();
/// let id = calendar
///     .schedule_event(TaskKind::Temporal(task), 5.0, 5.0, 5.0, 5.0)
///     .unwrap();
///
/// let day = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
/// let schedule = calendar.generate_schedule(day).unwrap();
/// assert_eq!(schedule.len(), 1);
/// assert!(schedule.contains_key(&id));
/// ```
#[derive(Debug, Default)]
pub struct Calendar {
    tree: TimeTree,
    events: HashMap<Id, Event>,
    dated_todos: Vec<Id>,
    todos: Vec<Id>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events the calendar owns.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Read-only view of the interval index, for diagnostics.
    pub fn tree(&self) -> &TimeTree {
        &self.tree
    }

    /// Builds an [`Event`] from the task and weights and routes it:
    /// temporal tasks into the time tree, deadline-only tasks into the
    /// dated queue (deadline ascending, stable), the rest into the plain
    /// todo list. Returns the new event's id.
    ///
    /// # Errors
    ///
    /// Weight validation runs first; nothing is stored on failure.
    pub fn schedule_event(
        &mut self,
        task: TaskKind,
        goal_value: f64,
        routine_value: f64,
        personal_value: f64,
        relational_value: f64,
    ) -> Result<Id, CalendarError> {
        let event = Event::new(
            task,
            goal_value,
            routine_value,
            personal_value,
            relational_value,
        )?;
        let id = event.id().to_string();

        match event.task() {
            TaskKind::Temporal(_) => {
                self.tree.insert(&event)?;
            }
            TaskKind::Todo(task) => {
                if let Some(deadline) = task.deadline() {
                    let at = self.dated_todos.partition_point(|existing| {
                        self.events
                            .get(existing)
                            .and_then(|event| event.task().deadline())
                            .is_some_and(|existing_deadline| existing_deadline <= deadline)
                    });
                    self.dated_todos.insert(at, id.clone());
                } else {
                    self.todos.push(id.clone());
                }
            }
        }
        self.events.insert(id.clone(), event);
        Ok(id)
    }

    /// Removes an event from its index and the registry, returning it.
    pub fn unschedule_event(&mut self, id: &str) -> Result<Event, CalendarError> {
        let Some(event) = self.events.get(id) else {
            return Err(CalendarError::EventNotFound(id.to_string()));
        };
        match event.task() {
            TaskKind::Temporal(_) => self.tree.delete(event)?,
            TaskKind::Todo(task) => {
                if task.deadline().is_some() {
                    self.dated_todos.retain(|existing| existing != id);
                } else {
                    self.todos.retain(|existing| existing != id);
                }
            }
        }
        self.events
            .remove(id)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    /// Looks an event up by task title.
    pub fn event_by_title(&self, title: &str) -> Result<&Event, CalendarError> {
        self.events
            .values()
            .find(|event| event.task().title() == title)
            .ok_or_else(|| CalendarError::TitleNotFound(title.to_string()))
    }

    /// All `{event, key}` records whose candidate interval overlaps the
    /// query.
    pub fn get_events(&self, interval: TimeInterval) -> Vec<Hit> {
        self.tree.overlap_search(interval)
    }

    /// Overlap hits for a whole day (`00:00:00` to `23:59:59`).
    pub fn day_events(&self, day: NaiveDate) -> Vec<Hit> {
        self.tree.overlap_search(day_window(day))
    }

    /// The day's events, deduplicated, ordered by descending priority at
    /// `now`. Diagnostic ordering only.
    pub fn day_events_by_priority(&self, day: NaiveDate, now: DateTime<Utc>) -> Vec<&Event> {
        let mut seen: Vec<&Id> = Vec::new();
        for hit in self.day_events(day) {
            if !seen.iter().any(|id| **id == hit.event) {
                if let Some((id, _)) = self.events.get_key_value(&hit.event) {
                    seen.push(id);
                }
            }
        }
        let mut events: Vec<&Event> = seen
            .into_iter()
            .filter_map(|id| self.events.get(id))
            .collect();
        events.sort_by(|a, b| b.priority(now).total_cmp(&a.priority(now)));
        events
    }

    /// Plain todos in insertion order.
    pub fn todos(&self) -> Vec<&Event> {
        self.todos
            .iter()
            .filter_map(|id| self.events.get(id))
            .collect()
    }

    /// Deadline-only todos, deadline ascending.
    pub fn dated_todos(&self) -> Vec<&Event> {
        self.dated_todos
            .iter()
            .filter_map(|id| self.events.get(id))
            .collect()
    }

    /// Produces a conflict-free assignment for every event whose
    /// candidates touch the given day.
    ///
    /// The pipeline: query the tree over the day window, build per-event
    /// domains from the hits, derive arcs with the sweep-line pass, then
    /// run AC-3 followed by backtracking with interval splitting.
    ///
    /// # Errors
    ///
    /// Propagates [`CspError`](crate::csp::CspError) infeasibility:
    /// a wiped-out domain names the offending event, exhaustion carries
    /// no culprit (the caller may relax windows and retry).
    pub fn generate_schedule(
        &self,
        day: NaiveDate,
    ) -> Result<HashMap<Id, TimeInterval>, CalendarError> {
        let window = day_window(day);
        let hits = self.tree.overlap_search(window);
        debug!(%day, hits = hits.len(), "collected day-window overlaps");
        if hits.is_empty() {
            return Ok(HashMap::new());
        }

        let mut domains: HashMap<Id, Vec<TimeInterval>> = HashMap::new();
        for hit in &hits {
            domains
                .entry(hit.event.clone())
                .or_default()
                .push(hit.key);
        }

        // The tree only indexes temporal tasks, so every hit resolves to
        // an event with a duration.
        let mut variables: Vec<(&Event, Vec<TimeInterval>)> = Vec::new();
        for (id, domain) in domains {
            let Some(event) = self.events.get(&id) else {
                continue;
            };
            if event.as_temporal().is_some() {
                variables.push((event, domain));
            }
        }
        // Deterministic variable order: nominal slot, then title.
        variables.sort_by(|(a, _), (b, _)| {
            let key_a = a.as_temporal().map(|t| (t.start(), t.end()));
            let key_b = b.as_temporal().map(|t| (t.start(), t.end()));
            key_a
                .cmp(&key_b)
                .then_with(|| a.task().title().cmp(b.task().title()))
        });

        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut csp = Csp::new();
        for (index, (event, domain)) in variables.iter().enumerate() {
            position.insert(event.id(), index);
            let Some(duration) = event.duration() else {
                continue;
            };
            csp.add_event(event.id().to_string(), duration, domain.clone())?;
        }

        let pairs = sweep::pair_overlaps(&hits);
        let mut arcs: Vec<(&Id, &Id)> = pairs.keys().map(|(a, b)| (a, b)).collect();
        arcs.sort_by_key(|(a, b)| {
            (
                position.get(a.as_str()).copied(),
                position.get(b.as_str()).copied(),
            )
        });
        for (first, second) in arcs {
            csp.add_arc(first, second)?;
        }
        debug!(
            variables = csp.len(),
            pairs = pairs.len(),
            "constructed scheduling csp"
        );

        Ok(csp.solve()?)
    }
}

/// The closed day window `[00:00:00, 23:59:59]`.
fn day_window(day: NaiveDate) -> TimeInterval {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    TimeInterval::from_ordered_unchecked(start, start + TimeDelta::seconds(86_399))
}

// =============================================================================
// Calendar Serde Support
// =============================================================================

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use crate::model::{Task, TemporalTask};
    use serde::de;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Flat on-disk record: one task with its placement fields and the
    /// four event weights.
    #[derive(Serialize, Deserialize)]
    struct EventRecord {
        title: String,
        description: String,
        #[serde(default)]
        completed: bool,
        #[serde(default)]
        start: Option<DateTime<Utc>>,
        #[serde(default)]
        end: Option<DateTime<Utc>>,
        #[serde(default)]
        startline: Option<DateTime<Utc>>,
        #[serde(default)]
        deadline: Option<DateTime<Utc>>,
        #[serde(default)]
        intervals: Vec<TimeInterval>,
        goal_value: f64,
        routine_value: f64,
        personal_value: f64,
        relational_value: f64,
    }

    impl EventRecord {
        fn from_event(event: &Event) -> Self {
            let task = event.task();
            Self {
                title: task.title().to_string(),
                description: task.task().description().to_string(),
                completed: task.is_completed(),
                start: task.as_temporal().map(|t| t.start()),
                end: task.as_temporal().map(|t| t.end()),
                startline: task.as_temporal().and_then(|t| t.startline()),
                deadline: task.deadline(),
                intervals: task
                    .schedule_intervals()
                    .map(|set| set.as_slice().to_vec())
                    .unwrap_or_default(),
                goal_value: event.goal_value(),
                routine_value: event.routine_value(),
                personal_value: event.personal_value(),
                relational_value: event.relational_value(),
            }
        }

        fn into_task(self) -> Result<(TaskKind, f64, f64, f64, f64), String> {
            let mut kind = match (self.start, self.end) {
                (Some(start), Some(end)) => TaskKind::Temporal(
                    TemporalTask::new(
                        self.title,
                        self.description,
                        start,
                        end,
                        self.startline,
                        self.deadline,
                        Some(self.intervals),
                    )
                    .map_err(|error| error.to_string())?,
                ),
                _ => TaskKind::Todo(
                    Task::new(self.title, self.description, self.deadline)
                        .map_err(|error| error.to_string())?,
                ),
            };
            if self.completed {
                kind.set_completed();
            }
            Ok((
                kind,
                self.goal_value,
                self.routine_value,
                self.personal_value,
                self.relational_value,
            ))
        }
    }

    impl Serialize for Calendar {
        /// Serializes as a flat sequence of event records in
        /// deterministic chronological order: temporal events by nominal
        /// slot and title, then dated todos by deadline, then plain todos
        /// in insertion order.
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut temporal: Vec<&Event> = self
                .events
                .values()
                .filter(|event| event.as_temporal().is_some())
                .collect();
            temporal.sort_by(|a, b| {
                let key_a = a.as_temporal().map(|t| (t.start(), t.end()));
                let key_b = b.as_temporal().map(|t| (t.start(), t.end()));
                key_a
                    .cmp(&key_b)
                    .then_with(|| a.task().title().cmp(b.task().title()))
            });

            let mut seq = serializer.serialize_seq(Some(self.events.len()))?;
            for event in temporal {
                seq.serialize_element(&EventRecord::from_event(event))?;
            }
            for event in self.dated_todos() {
                seq.serialize_element(&EventRecord::from_event(event))?;
            }
            for event in self.todos() {
                seq.serialize_element(&EventRecord::from_event(event))?;
            }
            seq.end()
        }
    }

    impl<'de> Deserialize<'de> for Calendar {
        /// Rebuilds through [`Calendar::schedule_event`], so every stored
        /// record is re-validated on the way in.
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let records = Vec::<EventRecord>::deserialize(deserializer)?;
            let mut calendar = Calendar::new();
            for record in records {
                let (kind, goal, routine, personal, relational) =
                    record.into_task().map_err(de::Error::custom)?;
                calendar
                    .schedule_event(kind, goal, routine, personal, relational)
                    .map_err(de::Error::custom)?;
            }
            Ok(calendar)
        }
    }
}
