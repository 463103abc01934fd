//! Part assembly: merging segment tabs into one consistent part.
//!
//! A tab that participates in several connections appears once per
//! segment, each instance carrying its own bend run. The merge walks both
//! ordered perimeters in lockstep, synchronizing on shared corners; a
//! one-sided run of strategy points is consumed whole, while two
//! different runs at the same slot mean the bends would overlap and the
//! combination is rejected. After merging, strategy points are mapped to
//! the rectangle edge they sit on (no edge may serve two connections) and
//! coincident points contributed by different connections collapse to
//! one.

use std::collections::{BTreeMap, HashMap};

use crate::config::EngineConfig;
use crate::filters::part_has_collision;
use crate::geom::{Line3, Point3, Tolerance};
use crate::part::{CornerId, Part, PointKey, Segment, Tab, TabId, perimeter_is_simple};
use crate::topology::Pair;

/// Assemble one chosen combination into a part. `None` rejects the
/// combination (merge conflict, edge reuse, broken perimeter or
/// collision); rejection is never an error.
#[must_use]
pub fn assemble(combo: &[&Segment], sequence: &[Pair], cfg: &EngineConfig) -> Option<Part> {
    let mut instances: BTreeMap<TabId, Vec<&Tab>> = BTreeMap::new();
    for segment in combo {
        for tab in segment.tabs() {
            instances.entry(tab.id().clone()).or_default().push(tab);
        }
    }

    let mut tabs: BTreeMap<TabId, Tab> = BTreeMap::new();
    for (id, tab_instances) in instances {
        let merged = merge_instances(&tab_instances)?;
        tabs.insert(id, merged);
    }

    for tab in tabs.values() {
        if !perimeter_is_simple(tab) {
            log::debug!("rejecting combination: tab {} perimeter is not simple", tab.id());
            return None;
        }
    }

    if cfg.filters.check_collision && part_has_collision(&tabs, cfg.filters.collision_gap) {
        log::debug!("rejecting combination: collision between tabs");
        return None;
    }

    Some(Part::new(tabs, sequence.to_vec()))
}

/// Merge all instances of one tab id. Instances merge pairwise left to
/// right; a single instance passes through untouched.
#[must_use]
pub fn merge_instances(instances: &[&Tab]) -> Option<Tab> {
    let (first, rest) = instances.split_first()?;
    let mut merged = (*first).clone();
    for tab in rest {
        merged = merge_two(&merged, tab)?;
    }
    if rest.is_empty() {
        return Some(merged);
    }

    let merged = collapse_coincident(&merged);
    if !edge_usage_is_exclusive(&merged) {
        return None;
    }
    Some(merged)
}

/// Synchronization-point walk over two ordered perimeters.
fn merge_two(a: &Tab, b: &Tab) -> Option<Tab> {
    let pa = a.points();
    let pb = b.points();
    let mut out: Vec<(PointKey, Point3)> = Vec::with_capacity(pa.len() + pb.len());
    let mut i = 0;
    let mut j = 0;

    while i < pa.len() || j < pb.len() {
        match (pa.get(i), pb.get(j)) {
            (Some((ka, va)), Some((kb, _))) => {
                if !ka.is_corner() && !kb.is_corner() {
                    // Two different bend runs competing for the same slot.
                    log::debug!(
                        "merge conflict on tab {}: runs {ka} and {kb} overlap",
                        a.id()
                    );
                    return None;
                }
                if !ka.is_corner() {
                    consume_run(pa, &mut i, &mut out);
                } else if !kb.is_corner() {
                    consume_run(pb, &mut j, &mut out);
                } else if ka == kb {
                    out.push((ka.clone(), *va));
                    i += 1;
                    j += 1;
                } else if b.position(ka).is_none() {
                    // Corner consumed by one of b's connections; a still
                    // carries it.
                    out.push((ka.clone(), *va));
                    i += 1;
                } else if a.position(kb).is_none() {
                    let (kb, vb) = &pb[j];
                    out.push((kb.clone(), *vb));
                    j += 1;
                } else {
                    // Both perimeters still contain each other's corner but
                    // in incompatible order.
                    log::debug!(
                        "merge conflict on tab {}: corner order diverges at {ka}/{kb}",
                        a.id()
                    );
                    return None;
                }
            }
            (Some(_), None) => consume_rest(pa, &mut i, &mut out),
            (None, Some(_)) => consume_rest(pb, &mut j, &mut out),
            (None, None) => break,
        }
    }

    Some(a.with_points(out))
}

/// Consume a contiguous run of strategy points.
fn consume_run(points: &[(PointKey, Point3)], i: &mut usize, out: &mut Vec<(PointKey, Point3)>) {
    while let Some((k, v)) = points.get(*i) {
        if k.is_corner() {
            break;
        }
        out.push((k.clone(), *v));
        *i += 1;
    }
}

fn consume_rest(points: &[(PointKey, Point3)], i: &mut usize, out: &mut Vec<(PointKey, Point3)>) {
    while let Some((k, v)) = points.get(*i) {
        out.push((k.clone(), *v));
        *i += 1;
    }
}

/// Drop strategy points that coincide with an earlier strategy point from
/// a different connection; the first occurrence wins.
fn collapse_coincident(tab: &Tab) -> Tab {
    let mut kept: Vec<(PointKey, Point3)> = Vec::with_capacity(tab.len());
    for (key, point) in tab.points() {
        let duplicate = !key.is_corner()
            && kept.iter().any(|(other, p)| {
                !other.is_corner()
                    && other.connection() != key.connection()
                    && Tolerance::COINCIDENT.approx_eq_point3(*p, *point)
            });
        if duplicate {
            log::debug!("collapsing coincident point {key} on tab {}", tab.id());
            continue;
        }
        kept.push((key.clone(), *point));
    }
    tab.with_points(kept)
}

/// Map every strategy point to the rectangle edge it lies on (perpendicular
/// distance to the infinite edge line; extension beyond the segment is
/// allowed) and require that each edge serves at most one connection.
fn edge_usage_is_exclusive(tab: &Tab) -> bool {
    let Some(rect) = tab.rectangle() else {
        return true;
    };

    let edges: Vec<(CornerId, Line3)> = CornerId::ALL
        .iter()
        .filter_map(|&c| {
            let (from, to) = rect.edge(c);
            Line3::through(from, to).map(|line| (c, line))
        })
        .collect();

    let mut edge_users: HashMap<usize, &TabId> = HashMap::new();
    for (key, point) in tab.points() {
        let Some(connection) = key.connection() else {
            continue;
        };
        let nearest = edges
            .iter()
            .enumerate()
            .min_by(|(_, (_, la)), (_, (_, lb))| {
                la.distance_to_point(*point)
                    .partial_cmp(&lb.distance_to_point(*point))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx);
        let Some(edge_idx) = nearest else {
            continue;
        };
        match edge_users.get(&edge_idx) {
            Some(user) if *user != connection => {
                log::debug!(
                    "tab {}: edge {} serves connections {user} and {connection}",
                    tab.id(),
                    edges[edge_idx].0,
                );
                return false;
            }
            _ => {
                edge_users.insert(edge_idx, connection);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::{Rectangle, Side};

    fn base_tab(id: &str) -> Tab {
        let rect = Rectangle::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(50.0, 50.0, 0.0),
        );
        Tab::from_rectangle(TabId::new(id), rect, Vec::new())
    }

    /// A run centered on the given edge, pushed outward a little.
    fn run_on(tab: &Tab, from: CornerId, to: CornerId, peer: &str) -> Tab {
        let mut tab = tab.clone();
        let owner = tab.id().clone();
        let peer = TabId::new(peer);
        let rect = *tab.rectangle().unwrap();
        let (p_from, p_to) = rect.edge(from);
        let out = crate::geom::Vec3::new(
            (p_from.midpoint(p_to).x - 25.0) * 0.1,
            (p_from.midpoint(p_to).y - 25.0) * 0.1,
            0.0,
        );
        let fl = p_from.lerp(p_to, 0.2) + out;
        let bl = p_from.lerp(p_to, 0.2) + out * 2.0;
        let br = p_from.lerp(p_to, 0.8) + out * 2.0;
        let fr = p_from.lerp(p_to, 0.8) + out;
        tab.insert_edge_run(
            from,
            to,
            vec![
                (PointKey::flange(&owner, &peer, Side::Left), fl),
                (PointKey::bend(&owner, &peer, Side::Left), bl),
                (PointKey::bend(&owner, &peer, Side::Right), br),
                (PointKey::flange(&owner, &peer, Side::Right), fr),
            ],
        );
        tab
    }

    #[test]
    fn single_instance_is_a_no_op() {
        let tab = base_tab("0");
        let merged = merge_instances(&[&tab]).unwrap();
        assert_eq!(merged.len(), tab.len());
        for ((ka, pa), (kb, pb)) in merged.points().iter().zip(tab.points()) {
            assert_eq!(ka, kb);
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn non_conflicting_runs_merge_with_every_point_once() {
        let base = base_tab("1");
        let on_ab = run_on(&base, CornerId::A, CornerId::B, "0");
        let on_cd = run_on(&base, CornerId::C, CornerId::D, "2");

        let merged = merge_instances(&[&on_ab, &on_cd]).unwrap();
        // 4 corners + two 4-point runs.
        assert_eq!(merged.len(), 12);
        // Every key from both instances survives exactly once.
        for source in [&on_ab, &on_cd] {
            for (key, _) in source.points() {
                assert!(merged.position(key).is_some(), "missing {key}");
            }
        }
        let keys: Vec<String> = merged.points().iter().map(|(k, _)| k.to_string()).collect();
        let unique: std::collections::HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn same_edge_runs_fail_to_merge() {
        let base = base_tab("1");
        let first = run_on(&base, CornerId::A, CornerId::B, "0");
        let second = run_on(&base, CornerId::A, CornerId::B, "2");
        assert!(merge_instances(&[&first, &second]).is_none());
    }

    #[test]
    fn coincident_points_collapse_to_first() {
        let base = base_tab("1");
        let mut first = base.clone();
        let owner = TabId::new("1");
        let shared_point = Point3::new(20.0, -5.0, 0.0);
        first.insert_edge_run(
            CornerId::A,
            CornerId::B,
            vec![
                (
                    PointKey::flange(&owner, &TabId::new("0"), Side::Left),
                    shared_point,
                ),
                (
                    PointKey::bend(&owner, &TabId::new("0"), Side::Left),
                    Point3::new(20.0, -10.0, 0.0),
                ),
                (
                    PointKey::bend(&owner, &TabId::new("0"), Side::Right),
                    Point3::new(30.0, -10.0, 0.0),
                ),
                (
                    PointKey::flange(&owner, &TabId::new("0"), Side::Right),
                    Point3::new(30.0, -5.0, 0.0),
                ),
            ],
        );
        let mut second = base.clone();
        second.insert_edge_run(
            CornerId::B,
            CornerId::C,
            vec![
                (
                    PointKey::flange(&owner, &TabId::new("2"), Side::Left),
                    shared_point,
                ),
                (
                    PointKey::bend(&owner, &TabId::new("2"), Side::Left),
                    Point3::new(55.0, 20.0, 0.0),
                ),
                (
                    PointKey::bend(&owner, &TabId::new("2"), Side::Right),
                    Point3::new(55.0, 30.0, 0.0),
                ),
                (
                    PointKey::flange(&owner, &TabId::new("2"), Side::Right),
                    Point3::new(50.0, 30.0, 0.0),
                ),
            ],
        );

        let merged = merge_instances(&[&first, &second]).unwrap();
        let occurrences = merged
            .points()
            .iter()
            .filter(|(_, p)| Tolerance::COINCIDENT.approx_eq_point3(*p, shared_point))
            .count();
        assert_eq!(occurrences, 1);
        // The first connection's key won.
        assert!(
            merged
                .position(&PointKey::flange(&owner, &TabId::new("0"), Side::Left))
                .is_some()
        );
        assert!(
            merged
                .position(&PointKey::flange(&owner, &TabId::new("2"), Side::Left))
                .is_none()
        );
    }
}
