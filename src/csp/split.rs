//! Interval splitting: narrowing two overlapping assignments into ranges
//! that can still host their durations disjointly.

use chrono::{DateTime, TimeDelta, Utc};

use crate::interval::TimeInterval;

/// Splits the overlapping assignments `i` (earlier) and `j` (incoming)
/// into `(i', j')` such that a task of duration `di` placed somewhere in
/// `i'` and one of `dj` in `j'` can avoid each other.
///
/// Four sub-intervals are formed, clipping each assignment so the other
/// task still fits on the far side; `(s1, s3)` places the first task
/// early, `(s2, s4)` places the second early. Each pair collapses through
/// [`merge_split`]; the split fails if either side collapses to nothing
/// or the combined span cannot host both durations.
pub(crate) fn split(
    i: TimeInterval,
    j: TimeInterval,
    di: TimeDelta,
    dj: TimeDelta,
) -> Option<(TimeInterval, TimeInterval)> {
    let s1 = clipped(i.start(), (j.end() - dj).min(i.end()));
    let s2 = clipped((i.start() + di).max(j.start()), j.end());
    let s3 = clipped(j.start(), (i.end() - di).min(j.end()));
    let s4 = clipped((j.start() + dj).max(i.start()), i.end());

    let i_narrowed = merge_split(s1, s3, di, dj)?;
    let j_narrowed = merge_split(s2, s4, di, dj)?;

    let span = i_narrowed.end().max(j_narrowed.end()) - i_narrowed.start().min(j_narrowed.start());
    (span >= di + dj).then_some((i_narrowed, j_narrowed))
}

/// A candidate sub-interval; `None` when the clip inverted it.
fn clipped(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<TimeInterval> {
    (start <= end).then(|| TimeInterval::from_ordered_unchecked(start, end))
}

/// Collapses a sub-interval pair: keep the hull when both admit their
/// duration, the surviving one when only one does, nothing otherwise.
fn merge_split(
    a: Option<TimeInterval>,
    b: Option<TimeInterval>,
    da: TimeDelta,
    db: TimeDelta,
) -> Option<TimeInterval> {
    let a = a.filter(|interval| interval.duration() >= da);
    let b = b.filter(|interval| interval.duration() >= db);
    match (a, b) {
        (Some(a), Some(b)) => Some(TimeInterval::from_ordered_unchecked(
            a.start().min(b.start()),
            a.end().max(b.end()),
        )),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
