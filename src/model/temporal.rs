//! Task with a nominal placement and flexible candidate intervals.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::TaskError;
use super::task::Task;
use crate::interval::{IntervalSet, TimeInterval, WindowError};

/// A task bound to time: a nominal slot `[start, end]`, an optional outer
/// window `[startline, deadline]`, and the set of candidate intervals in
/// which it may legally be placed.
///
/// # Invariants
///
/// - `start <= end` and `end - start >= 5 s`
/// - `startline <= start` and `end <= deadline` when those bounds exist
/// - every candidate interval lies within `[startline, deadline]`
/// - candidates are pairwise disjoint (overlapping additions are merged)
/// - the nominal `[start, end]` is always contained in some candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalTask {
    task: Task,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    startline: Option<DateTime<Utc>>,
    intervals: IntervalSet,
}

impl TemporalTask {
    /// Minimum span, in seconds, of the nominal slot and of the outer
    /// window.
    pub const MIN_SPAN_SECONDS: i64 = 5;

    /// Creates a temporal task, validating every invariant before any
    /// state is built. Supplied candidates are merged in order, then the
    /// nominal `[start, end]` is added as a candidate of its own.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        startline: Option<DateTime<Utc>>,
        deadline: Option<DateTime<Utc>>,
        intervals: Option<Vec<TimeInterval>>,
    ) -> Result<Self, TaskError> {
        let task = Task::new(title, description, deadline)?;

        if start > end {
            return Err(WindowError::StartAfterEnd { start, end }.into());
        }
        if end - start < Self::min_span() {
            return Err(WindowError::BelowMinimumDuration {
                got_seconds: (end - start).num_seconds(),
            }
            .into());
        }
        if let Some(startline) = startline {
            if start < startline {
                return Err(WindowError::StartBeforeStartline { start, startline }.into());
            }
        }
        if let Some(deadline) = deadline {
            if end > deadline {
                return Err(WindowError::EndAfterDeadline { end, deadline }.into());
            }
        }
        if let (Some(startline), Some(deadline)) = (startline, deadline) {
            if deadline - startline < Self::min_span() {
                return Err(WindowError::WindowTooNarrow { startline, deadline }.into());
            }
        }

        let mut temporal = Self {
            task,
            start,
            end,
            startline,
            intervals: IntervalSet::new(),
        };
        for interval in intervals.unwrap_or_default() {
            temporal.add_schedule_interval(interval)?;
        }
        temporal.add_schedule_interval(TimeInterval::new(start, end)?)?;
        Ok(temporal)
    }

    fn min_span() -> TimeDelta {
        TimeDelta::seconds(Self::MIN_SPAN_SECONDS)
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn title(&self) -> &str {
        self.task.title()
    }

    pub fn description(&self) -> &str {
        self.task.description()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn startline(&self) -> Option<DateTime<Utc>> {
        self.startline
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.task.deadline()
    }

    pub fn is_completed(&self) -> bool {
        self.task.is_completed()
    }

    pub fn set_completed(&mut self) {
        self.task.set_completed();
    }

    /// The nominal duration `end - start`.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// The nominal placement slot `[start, end]`.
    pub fn time_slot(&self) -> TimeInterval {
        TimeInterval::from_ordered_unchecked(self.start, self.end)
    }

    /// The candidate placement intervals, pairwise disjoint, sorted by
    /// start.
    pub fn schedule_intervals(&self) -> &IntervalSet {
        &self.intervals
    }

    /// Adds a candidate placement interval.
    ///
    /// All existing candidates overlapping `interval` are replaced by the
    /// single merged hull. The merged hull cannot escape the outer window:
    /// every merged member was individually validated inside it, and the
    /// hull endpoints are the min/max of member endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::OutsideWindow`] if `interval` leaves
    /// `[startline, deadline]`.
    pub fn add_schedule_interval(&mut self, interval: TimeInterval) -> Result<(), WindowError> {
        if let Some(startline) = self.startline {
            if interval.start() < startline {
                return Err(WindowError::OutsideWindow { interval });
            }
        }
        if let Some(deadline) = self.task.deadline() {
            if interval.end() > deadline {
                return Err(WindowError::OutsideWindow { interval });
            }
        }

        let merged = self.intervals.push(interval);
        debug_assert!(
            self.startline.map_or(true, |s| s <= merged.start())
                && self.task.deadline().map_or(true, |d| merged.end() <= d),
            "merged candidate escaped the startline/deadline window"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{iv, ts};

    fn make(
        start: (u32, u32),
        end: (u32, u32),
        startline: Option<(u32, u32)>,
        deadline: Option<(u32, u32)>,
        intervals: Option<Vec<TimeInterval>>,
    ) -> Result<TemporalTask, TaskError> {
        TemporalTask::new(
            "task",
            "",
            ts(start.0, start.1),
            ts(end.0, end.1),
            startline.map(|(h, m)| ts(h, m)),
            deadline.map(|(h, m)| ts(h, m)),
            intervals,
        )
    }

    #[test]
    fn nominal_slot_becomes_a_candidate() {
        let task = make((9, 0), (10, 0), None, None, None).unwrap();
        assert_eq!(task.schedule_intervals().as_slice(), &[iv(9, 0, 10, 0)]);
        assert_eq!(task.time_slot(), iv(9, 0, 10, 0));
        assert_eq!(task.duration(), TimeDelta::hours(1));
    }

    #[test]
    fn rejects_start_after_end() {
        let err = make((10, 0), (9, 0), None, None, None).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Window(WindowError::StartAfterEnd { .. })
        ));
    }

    #[test]
    fn rejects_slot_below_five_seconds() {
        let start = ts(9, 0);
        let err = TemporalTask::new("t", "", start, start + TimeDelta::seconds(4), None, None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            TaskError::Window(WindowError::BelowMinimumDuration { got_seconds: 4 })
        ));
    }

    #[test]
    fn rejects_start_before_startline() {
        let err = make((9, 0), (10, 0), Some((9, 30)), None, None).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Window(WindowError::StartBeforeStartline { .. })
        ));
    }

    #[test]
    fn rejects_end_after_deadline() {
        let err = make((9, 0), (10, 0), None, Some((9, 30)), None).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Window(WindowError::EndAfterDeadline { .. })
        ));
    }

    #[test]
    fn rejects_candidate_outside_window() {
        let err = make(
            (9, 0),
            (10, 0),
            Some((8, 0)),
            Some((12, 0)),
            Some(vec![iv(12, 30, 13, 0)]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TaskError::Window(WindowError::OutsideWindow { .. })
        ));
    }

    #[test]
    fn overlapping_additions_merge_into_hull() {
        // Nominal [10:00, 10:10] plus [10:05, 10:20] and [10:30, 10:40]
        // yields exactly two candidates.
        let task = make(
            (10, 0),
            (10, 10),
            None,
            None,
            Some(vec![iv(10, 5, 10, 20), iv(10, 30, 10, 40)]),
        )
        .unwrap();
        assert_eq!(
            task.schedule_intervals().as_slice(),
            &[iv(10, 0, 10, 20), iv(10, 30, 10, 40)]
        );
    }

    #[test]
    fn candidates_round_trip_to_merged_union() {
        let supplied = vec![iv(6, 0, 7, 0), iv(7, 30, 8, 0)];
        let task = make((7, 0), (7, 30), None, None, Some(supplied)).unwrap();
        // The nominal slot touches both supplied candidates, so all three
        // merge into one hull.
        assert_eq!(task.schedule_intervals().as_slice(), &[iv(6, 0, 8, 0)]);
        let slot = task.time_slot();
        assert!(task
            .schedule_intervals()
            .iter()
            .any(|candidate| candidate.contains_interval(&slot)));
    }

    #[test]
    fn add_schedule_interval_enforces_window_after_construction() {
        let mut task = make((9, 0), (10, 0), Some((8, 0)), Some((12, 0)), None).unwrap();
        task.add_schedule_interval(iv(11, 0, 11, 30)).unwrap();
        assert!(task.add_schedule_interval(iv(7, 0, 7, 30)).is_err());
        assert_eq!(
            task.schedule_intervals().as_slice(),
            &[iv(9, 0, 10, 0), iv(11, 0, 11, 30)]
        );
    }
}
