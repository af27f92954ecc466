//! The binary schedulability constraint between two candidate intervals.

use chrono::TimeDelta;

use crate::interval::TimeInterval;

/// Returns true when two tasks of durations `d1`, `d2` can both be placed
/// inside the union of `i1`, `i2` without overlapping.
///
/// Three cases:
/// 1. Disjoint intervals: each task takes its own.
/// 2. One interval contained in the other: the inner task can slide
///    within its interval; the outer task fits if the slack left of the
///    inner interval or right of it admits its duration.
/// 3. Partial overlap: both fit iff the combined span admits the summed
///    durations.
pub(crate) fn fits(i1: TimeInterval, i2: TimeInterval, d1: TimeDelta, d2: TimeDelta) -> bool {
    if i1.end() < i2.start() || i2.end() < i1.start() {
        return true;
    }

    if i2.start() <= i1.start() && i1.end() <= i2.end() {
        // i1 inside i2: i1 may slide by its own slack.
        let sliding_room = i1.duration() - d1;
        let left_space = (i1.start() - i2.start()) + sliding_room;
        let right_space = (i2.end() - i1.end()) + sliding_room;
        return left_space >= d2 || right_space >= d2;
    }
    if i1.start() <= i2.start() && i2.end() <= i1.end() {
        // i2 inside i1.
        let sliding_room = i2.duration() - d2;
        let left_space = (i2.start() - i1.start()) + sliding_room;
        let right_space = (i1.end() - i2.end()) + sliding_room;
        return left_space >= d1 || right_space >= d1;
    }

    let span = i1.end().max(i2.end()) - i1.start().min(i2.start());
    d1 + d2 <= span
}
