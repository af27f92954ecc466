//! A canonical container for candidate placement intervals.
//!
//! [`IntervalSet`] wraps a `Vec<TimeInterval>` and guarantees the
//! **canonical invariant** at all times: intervals are sorted by start and
//! no two members overlap or touch (overlapping and touching members are
//! merged into their hull). Each member is therefore a genuinely distinct
//! placement choice, which keeps CSP domains small.
//!
//! Read access is transparent via `Deref<Target = [TimeInterval]>`;
//! mutation goes through [`push`](IntervalSet::push), which re-establishes
//! the invariant and reports the merged member.

use std::fmt::Display;
use std::ops::Deref;

use super::interval::TimeInterval;

/// A sorted set of pairwise-disjoint closed intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSet(Vec<TimeInterval>);

impl IntervalSet {
    /// Creates an empty interval set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Sorts by start and merges overlapping / touching intervals in place.
    fn normalize(&mut self) {
        if self.0.len() <= 1 {
            return;
        }
        self.0.sort();
        let mut merged: Vec<TimeInterval> = Vec::with_capacity(self.0.len());
        for interval in self.0.drain(..) {
            match merged.last_mut() {
                Some(last) if last.end() >= interval.start() => {
                    if interval.end() > last.end() {
                        *last = TimeInterval::from_ordered_unchecked(last.start(), interval.end());
                    }
                }
                _ => merged.push(interval),
            }
        }
        self.0 = merged;
    }

    /// Inserts an interval, merging it with every member it overlaps or
    /// touches, and returns the resulting member (the merged hull, or the
    /// interval itself when nothing overlapped).
    pub fn push(&mut self, interval: TimeInterval) -> TimeInterval {
        self.0.push(interval);
        self.normalize();
        self.0
            .iter()
            .copied()
            .find(|member| member.contains_interval(&interval))
            .unwrap_or(interval)
    }

    /// Removes all intervals.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Consumes the set and returns the underlying `Vec`.
    pub fn into_inner(self) -> Vec<TimeInterval> {
        self.0
    }

    /// Returns a slice of the intervals.
    pub fn as_slice(&self) -> &[TimeInterval] {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────
// Transparent read access
// ─────────────────────────────────────────────────────────────────────

impl Deref for IntervalSet {
    type Target = [TimeInterval];

    fn deref(&self) -> &[TimeInterval] {
        &self.0
    }
}

impl AsRef<[TimeInterval]> for IntervalSet {
    fn as_ref(&self) -> &[TimeInterval] {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────
// Conversions and iterators
// ─────────────────────────────────────────────────────────────────────

impl From<Vec<TimeInterval>> for IntervalSet {
    /// Creates an `IntervalSet` from an unsorted `Vec`, normalizing on
    /// construction.
    fn from(vec: Vec<TimeInterval>) -> Self {
        let mut set = Self(vec);
        set.normalize();
        set
    }
}

impl FromIterator<TimeInterval> for IntervalSet {
    fn from_iter<I: IntoIterator<Item = TimeInterval>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl IntoIterator for IntervalSet {
    type Item = TimeInterval;
    type IntoIter = std::vec::IntoIter<TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a TimeInterval;
    type IntoIter = std::slice::Iter<'a, TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Default for IntervalSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for IntervalSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, interval) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", interval)?;
        }
        write!(f, "}}")
    }
}

/// Enables `assert_eq!(interval_set, vec![...])` in tests.
impl PartialEq<Vec<TimeInterval>> for IntervalSet {
    fn eq(&self, other: &Vec<TimeInterval>) -> bool {
        self.0 == *other
    }
}

// ─────────────────────────────────────────────────────────────────────
// Serde support
// ─────────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl serde::Serialize for IntervalSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for IntervalSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let vec = Vec::<TimeInterval>::deserialize(deserializer)?;
        Ok(Self::from(vec))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
