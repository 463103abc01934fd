//! Segment combination search.
//!
//! Each pair of the topology contributes a list of mutually exclusive
//! candidate segments; a complete combination picks one per pair. The
//! Cartesian product is enumerated lazily (odometer over indices) so
//! pruning hooks can reject combinations before anything is materialized.
//!
//! The built-in pruning hook rejects combinations where a tab shared by
//! several connections would take two bends on the same edge. This is an
//! optimization only; the part assembler re-verifies the final geometry.

use std::collections::{BTreeMap, HashMap};

use crate::part::{CornerId, PointKey, Segment, Tab, TabId};
use crate::topology::Pair;

/// Lazy Cartesian product over per-pair candidate lists.
pub struct Combinations<'a> {
    libraries: &'a [Vec<Segment>],
    indices: Vec<usize>,
    exhausted: bool,
}

impl<'a> Combinations<'a> {
    #[must_use]
    pub fn new(libraries: &'a [Vec<Segment>]) -> Self {
        let exhausted = libraries.is_empty() || libraries.iter().any(Vec::is_empty);
        Self {
            libraries,
            indices: vec![0; libraries.len()],
            exhausted,
        }
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<&'a Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let combo: Vec<&Segment> = self
            .indices
            .iter()
            .zip(self.libraries)
            .map(|(&i, lib)| &lib[i])
            .collect();

        // Advance the odometer.
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.exhausted = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.libraries[pos].len() {
                break;
            }
            self.indices[pos] = 0;
        }

        Some(combo)
    }
}

/// Tab ids that appear in more than one pair of the sequence.
#[must_use]
pub fn shared_tab_ids(sequence: &[Pair]) -> Vec<TabId> {
    let mut counts: BTreeMap<&TabId, usize> = BTreeMap::new();
    for (a, b) in sequence {
        *counts.entry(a).or_insert(0) += 1;
        *counts.entry(b).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.clone())
        .collect()
}

/// Which original edge (as a normalized corner pair) carries this tab
/// instance's bend run? Scans the perimeter for the corner interval that
/// contains the bend points, wrap-aware.
#[must_use]
pub fn bend_edge_of(tab: &Tab) -> Option<(CornerId, CornerId)> {
    let points = tab.points();
    let n = points.len();
    let bend_positions: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, (k, _))| k.is_bend())
        .map(|(i, _)| i)
        .collect();
    if bend_positions.is_empty() {
        return None;
    }

    // For the first bend point, walk outward to the enclosing corners.
    let pos = bend_positions[0];
    let prev_corner = (1..n).find_map(|step| {
        let i = (pos + n - step) % n;
        points[i].0.corner()
    })?;
    let next_corner = (1..n).find_map(|step| {
        let i = (pos + step) % n;
        points[i].0.corner()
    })?;

    let (a, b) = if prev_corner <= next_corner {
        (prev_corner, next_corner)
    } else {
        (next_corner, prev_corner)
    };
    Some((a, b))
}

/// Would two connections of a shared tab land on the same edge?
#[must_use]
pub fn has_edge_conflict(combo: &[&Segment], shared: &[TabId]) -> bool {
    for tab_id in shared {
        let mut seen: HashMap<(CornerId, CornerId), usize> = HashMap::new();
        for segment in combo {
            for tab in segment.tabs() {
                if tab.id() != tab_id {
                    continue;
                }
                if let Some(edge) = bend_edge_of(tab) {
                    let count = seen.entry(edge).or_insert(0);
                    *count += 1;
                    if *count > 1 {
                        log::trace!(
                            "edge conflict on tab {tab_id}: edge {}-{} used twice",
                            edge.0,
                            edge.1
                        );
                        return true;
                    }
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3;
    use crate::part::{PointKey as PK, Rectangle, Side};

    fn base_tab(id: &str) -> Tab {
        let rect = Rectangle::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(50.0, 50.0, 0.0),
        );
        Tab::from_rectangle(TabId::new(id), rect, Vec::new())
    }

    fn with_run_on(tab: &Tab, from: CornerId, to: CornerId, peer: &str) -> Tab {
        let mut tab = tab.clone();
        let peer = TabId::new(peer);
        let owner = tab.id().clone();
        tab.insert_edge_run(
            from,
            to,
            vec![
                (PK::flange(&owner, &peer, Side::Left), Point3::new(10.0, -5.0, 0.0)),
                (PK::bend(&owner, &peer, Side::Left), Point3::new(10.0, -10.0, 0.0)),
                (PK::bend(&owner, &peer, Side::Right), Point3::new(40.0, -10.0, 0.0)),
                (PK::flange(&owner, &peer, Side::Right), Point3::new(40.0, -5.0, 0.0)),
            ],
        );
        tab
    }

    #[test]
    fn odometer_covers_the_product() {
        let t = base_tab("0");
        let z = base_tab("1");
        let seg = |_: usize| Segment::new((t.id().clone(), z.id().clone()), t.clone(), z.clone());
        let libraries = vec![
            vec![seg(0), seg(1)],
            vec![seg(0), seg(1), seg(2)],
        ];
        assert_eq!(Combinations::new(&libraries).count(), 6);
    }

    #[test]
    fn empty_library_yields_nothing() {
        let libraries: Vec<Vec<Segment>> = vec![Vec::new()];
        assert_eq!(Combinations::new(&libraries).count(), 0);
    }

    #[test]
    fn finds_bend_edge() {
        let tab = base_tab("1");
        let on_ab = with_run_on(&tab, CornerId::A, CornerId::B, "0");
        assert_eq!(bend_edge_of(&on_ab), Some((CornerId::A, CornerId::B)));
        let on_da = with_run_on(&tab, CornerId::D, CornerId::A, "2");
        assert_eq!(bend_edge_of(&on_da), Some((CornerId::A, CornerId::D)));
        assert_eq!(bend_edge_of(&tab), None);
    }

    #[test]
    fn detects_shared_edge_conflict() {
        let shared = base_tab("1");
        let other_a = base_tab("0");
        let other_b = base_tab("2");

        // Both connections put their run on edge A-B of tab 1.
        let seg_a = Segment::new(
            (TabId::new("0"), TabId::new("1")),
            other_a.clone(),
            with_run_on(&shared, CornerId::A, CornerId::B, "0"),
        );
        let seg_b = Segment::new(
            (TabId::new("1"), TabId::new("2")),
            with_run_on(&shared, CornerId::A, CornerId::B, "2"),
            other_b.clone(),
        );
        let combo = [&seg_a, &seg_b];
        let shared_ids = vec![TabId::new("1")];
        assert!(has_edge_conflict(&combo, &shared_ids));

        // Different edges: no conflict.
        let seg_c = Segment::new(
            (TabId::new("1"), TabId::new("2")),
            with_run_on(&shared, CornerId::B, CornerId::C, "2"),
            other_b,
        );
        let combo = [&seg_a, &seg_c];
        assert!(!has_edge_conflict(&combo, &shared_ids));
    }

    #[test]
    fn shared_ids_counts_pair_occurrences() {
        let seq = vec![
            (TabId::new("0"), TabId::new("1")),
            (TabId::new("1"), TabId::new("2")),
        ];
        assert_eq!(shared_tab_ids(&seq), vec![TabId::new("1")]);
    }
}
