//! Closed time interval over absolute UTC timestamps.

use std::fmt::Display;

use chrono::{DateTime, TimeDelta, Utc};

use super::error::WindowError;

/// Closed range `[start, end]` on the absolute time axis.
///
/// Intervals are immutable values ordered lexicographically by
/// `(start, end)`, which is also the key order of the time tree.
/// Endpoints are inclusive: two intervals that merely touch at one
/// instant still satisfy [`overlaps`](Self::overlaps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Creates the interval `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::StartAfterEnd`] if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// Wraps endpoints that are **already known to be ordered**.
    ///
    /// In debug builds this asserts `start <= end`; in release builds the
    /// check is elided.
    ///
    /// # Safety (logical)
    ///
    /// The caller must ensure `start <= end`. Violating this in release
    /// mode produces an interval with negative duration and incorrect
    /// results from every downstream operation.
    pub fn from_ordered_unchecked(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(
            start <= end,
            "TimeInterval::from_ordered_unchecked called with start > end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if `instant` ∈ `[start, end]`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Returns true if `other` lies entirely within this interval.
    pub fn contains_interval(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Closed-interval overlap: `self.start <= other.end && other.start <= self.end`.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

// =============================================================================
// TimeInterval Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TimeInterval", 2)?;
        s.serialize_field("start", &self.start)?;
        s.serialize_field("end", &self.end)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{iv, ts};

    #[test]
    fn creation_orders_endpoints() {
        let interval = TimeInterval::new(ts(7, 0), ts(8, 30)).unwrap();
        assert_eq!(interval.start(), ts(7, 0));
        assert_eq!(interval.end(), ts(8, 30));
        assert_eq!(interval.duration(), TimeDelta::minutes(90));
    }

    #[test]
    fn creation_rejects_reversed_endpoints() {
        let err = TimeInterval::new(ts(9, 0), ts(8, 0)).unwrap_err();
        assert!(matches!(err, WindowError::StartAfterEnd { .. }));
    }

    #[test]
    fn zero_length_interval_is_allowed() {
        let interval = TimeInterval::new(ts(7, 0), ts(7, 0)).unwrap();
        assert_eq!(interval.duration(), TimeDelta::zero());
    }

    #[test]
    fn contains_is_inclusive() {
        let interval = iv(7, 0, 8, 0);
        assert!(interval.contains(ts(7, 0)));
        assert!(interval.contains(ts(7, 30)));
        assert!(interval.contains(ts(8, 0)));
        assert!(!interval.contains(ts(8, 1)));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = iv(7, 0, 8, 0);
        let b = iv(7, 30, 9, 0);
        let c = iv(10, 0, 11, 0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn touching_intervals_overlap() {
        let a = iv(7, 0, 8, 0);
        let b = iv(8, 0, 9, 0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn contains_interval_requires_full_containment() {
        let outer = iv(6, 0, 9, 0);
        let inner = iv(7, 0, 8, 0);
        let partial = iv(8, 0, 10, 0);
        assert!(outer.contains_interval(&inner));
        assert!(!outer.contains_interval(&partial));
        assert!(!inner.contains_interval(&outer));
    }

    #[test]
    fn order_is_lexicographic_on_start_then_end() {
        let a = iv(7, 0, 8, 0);
        let b = iv(7, 0, 9, 0);
        let c = iv(7, 30, 7, 45);
        assert!(a < b);
        assert!(b < c);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let interval = iv(7, 0, 8, 0);
        let json = serde_json::to_string(&interval).unwrap();
        let back: TimeInterval = serde_json::from_str(&json).unwrap();
        assert_eq!(interval, back);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_reversed_endpoints() {
        let json = format!(
            "{{\"start\":\"{}\",\"end\":\"{}\"}}",
            ts(9, 0).to_rfc3339(),
            ts(8, 0).to_rfc3339()
        );
        assert!(serde_json::from_str::<TimeInterval>(&json).is_err());
    }
}
