//! Sweep-line extraction of pairwise candidate overlaps.
//!
//! Given the `{event, key}` hits of an overlap query, this pass derives
//! the symmetric relation "events E1 and E2 have at least one pair of
//! candidate intervals that overlap in time", together with the interval
//! pairs that witness it. The relation seeds the CSP's arc set.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::Hit;
use crate::interval::TimeInterval;
use crate::Id;

/// Symmetric map from an ordered event-id pair to the set of candidate
/// interval pairs `(first's interval, second's interval)` that overlap.
pub type OverlapPairs = HashMap<(Id, Id), HashSet<(TimeInterval, TimeInterval)>>;

/// Endpoint kind. `End` sorts before `Start` at equal timestamps, so a
/// candidate that ends exactly when another starts is *not* paired with
/// it: tasks meeting at one instant are physically compatible even though
/// the closed intervals technically overlap there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EndpointKind {
    End,
    Start,
}

/// Runs the sweep over the given hits.
///
/// Both orientations of every pair are recorded, so the result satisfies
/// `(a, b) ∈ pairs ⇔ (b, a) ∈ pairs`. Hits of the same event never pair
/// with each other.
pub fn pair_overlaps(hits: &[Hit]) -> OverlapPairs {
    let mut endpoints: Vec<(DateTime<Utc>, EndpointKind, usize)> =
        Vec::with_capacity(hits.len() * 2);
    for (index, hit) in hits.iter().enumerate() {
        endpoints.push((hit.key.start(), EndpointKind::Start, index));
        endpoints.push((hit.key.end(), EndpointKind::End, index));
    }
    endpoints.sort();

    let mut pairs = OverlapPairs::new();
    let mut active: Vec<usize> = Vec::new();
    for (_, kind, index) in endpoints {
        match kind {
            EndpointKind::Start => {
                let hit = &hits[index];
                for &other_index in &active {
                    let other = &hits[other_index];
                    if other.event == hit.event {
                        continue;
                    }
                    pairs
                        .entry((hit.event.clone(), other.event.clone()))
                        .or_default()
                        .insert((hit.key, other.key));
                    pairs
                        .entry((other.event.clone(), hit.event.clone()))
                        .or_default()
                        .insert((other.key, hit.key));
                }
                active.push(index);
            }
            EndpointKind::End => {
                active.retain(|&other_index| other_index != index);
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::iv;

    fn hit(event: &str, key: TimeInterval) -> Hit {
        Hit {
            event: event.to_string(),
            key,
        }
    }

    #[test]
    fn overlapping_candidates_pair_both_ways() {
        let hits = [hit("a", iv(9, 0, 10, 0)), hit("b", iv(9, 30, 11, 0))];
        let pairs = pair_overlaps(&hits);
        assert_eq!(pairs.len(), 2);

        let forward = &pairs[&("b".to_string(), "a".to_string())];
        assert!(forward.contains(&(iv(9, 30, 11, 0), iv(9, 0, 10, 0))));
        let backward = &pairs[&("a".to_string(), "b".to_string())];
        assert!(backward.contains(&(iv(9, 0, 10, 0), iv(9, 30, 11, 0))));
    }

    #[test]
    fn touching_candidates_do_not_pair() {
        let hits = [hit("a", iv(9, 0, 10, 0)), hit("b", iv(10, 0, 11, 0))];
        assert!(pair_overlaps(&hits).is_empty());
    }

    #[test]
    fn same_event_candidates_never_pair() {
        // Two hits of one event cannot conflict with themselves.
        let hits = [hit("a", iv(9, 0, 10, 0)), hit("a", iv(9, 30, 10, 30))];
        assert!(pair_overlaps(&hits).is_empty());
    }

    #[test]
    fn disjoint_candidates_produce_nothing() {
        let hits = [hit("a", iv(9, 0, 10, 0)), hit("b", iv(11, 0, 12, 0))];
        assert!(pair_overlaps(&hits).is_empty());
    }

    #[test]
    fn result_is_symmetric_and_witnessed() {
        let hits = [
            hit("a", iv(6, 0, 8, 0)),
            hit("b", iv(6, 30, 7, 0)),
            hit("b", iv(8, 0, 8, 30)),
            hit("c", iv(7, 30, 8, 30)),
        ];
        let pairs = pair_overlaps(&hits);
        for ((first, second), witnesses) in &pairs {
            let mirrored = &pairs[&(second.clone(), first.clone())];
            for (i1, i2) in witnesses {
                assert!(i1.overlaps(i2));
                assert!(mirrored.contains(&(*i2, *i1)));
            }
        }
        // a[6-8] overlaps b[6:30-7] and c[7:30-8:30]; b[8-8:30] overlaps
        // c[7:30-8:30]; b[8-8:30] only touches a[6-8].
        assert!(pairs.contains_key(&("a".to_string(), "b".to_string())));
        assert!(pairs.contains_key(&("a".to_string(), "c".to_string())));
        assert!(pairs.contains_key(&("b".to_string(), "c".to_string())));
        assert_eq!(
            pairs[&("a".to_string(), "b".to_string())],
            HashSet::from([(iv(6, 0, 8, 0), iv(6, 30, 7, 0))])
        );
    }
}
