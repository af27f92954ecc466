use chrono::{DateTime, Utc};
use thiserror::Error;

use super::TimeInterval;

/// Errors raised by time-window validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("interval start {start} is after its end {end}")]
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("placement spans {got_seconds} seconds, below the 5 second minimum")]
    BelowMinimumDuration { got_seconds: i64 },

    #[error("start {start} is before the startline {startline}")]
    StartBeforeStartline {
        start: DateTime<Utc>,
        startline: DateTime<Utc>,
    },

    #[error("end {end} is after the deadline {deadline}")]
    EndAfterDeadline {
        end: DateTime<Utc>,
        deadline: DateTime<Utc>,
    },

    #[error("startline {startline} to deadline {deadline} must span at least 5 seconds")]
    WindowTooNarrow {
        startline: DateTime<Utc>,
        deadline: DateTime<Utc>,
    },

    #[error("candidate interval {interval} lies outside the startline/deadline window")]
    OutsideWindow { interval: TimeInterval },
}
