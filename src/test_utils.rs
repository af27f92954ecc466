//! Shared factories for unit tests. All timestamps land on 2025-10-02 UTC
//! unless stated otherwise.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::interval::TimeInterval;
use crate::model::{Event, TaskKind, TemporalTask};

/// Timestamp on the test day (2025-10-02).
pub(crate) fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 2, hour, minute, 0).unwrap()
}

/// The test day itself.
pub(crate) fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 2).unwrap()
}

/// Interval on the test day.
pub(crate) fn iv(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> TimeInterval {
    TimeInterval::new(ts(start_hour, start_minute), ts(end_hour, end_minute)).unwrap()
}

/// Temporal task with a nominal slot and optional extra candidates, no
/// outer window.
pub(crate) fn temporal(
    title: &str,
    start: (u32, u32),
    end: (u32, u32),
    candidates: &[TimeInterval],
) -> TemporalTask {
    TemporalTask::new(
        title,
        "",
        ts(start.0, start.1),
        ts(end.0, end.1),
        None,
        None,
        Some(candidates.to_vec()),
    )
    .unwrap()
}

/// Event with neutral weights wrapping a temporal task.
pub(crate) fn temporal_event(
    title: &str,
    start: (u32, u32),
    end: (u32, u32),
    candidates: &[TimeInterval],
) -> Event {
    Event::new(
        TaskKind::Temporal(temporal(title, start, end, candidates)),
        5.0,
        5.0,
        5.0,
        5.0,
    )
    .unwrap()
}
