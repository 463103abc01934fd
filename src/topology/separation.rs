//! Surface separation: splitting multi-mount tabs.
//!
//! A tab holding several mounts is cut into one sub-tab per mount group,
//! with a gap between the pieces. Cuts run parallel to one rectangle edge;
//! in auto mode the split direction follows whichever in-plane axis has
//! the larger spread of mount positions. Sub-tabs of the same parent are
//! siblings and may never connect directly.

use std::collections::BTreeMap;

use crate::config::{SeparationConfig, SplitAxis};
use crate::geom::{Point3, Vec3};
use crate::part::{CornerId, Mount, Rectangle, Tab, TabId};

use super::Pair;

/// Split every eligible tab. Returns the new tab map plus the forbidden
/// sibling pairs.
#[must_use]
pub fn separate_surfaces(
    tabs: BTreeMap<TabId, Tab>,
    cfg: &SeparationConfig,
) -> (BTreeMap<TabId, Tab>, Vec<Pair>) {
    let mut result = BTreeMap::new();
    let mut forbidden = Vec::new();

    for (id, tab) in tabs {
        if !cfg.auto_split || tab.mounts().len() < cfg.min_mounts_for_split {
            result.insert(id, tab);
            continue;
        }

        let n_surfaces = tab.mounts().len().div_ceil(cfg.mounts_per_surface);
        if n_surfaces <= 1 {
            result.insert(id, tab);
            continue;
        }

        match split_tab(&tab, n_surfaces, cfg) {
            Some(children) => {
                log::debug!(
                    "split tab {id} into {} sub-tabs ({} mounts)",
                    children.len(),
                    tab.mounts().len()
                );
                let child_ids: Vec<TabId> = children.iter().map(|t| t.id().clone()).collect();
                for i in 0..child_ids.len() {
                    for j in (i + 1)..child_ids.len() {
                        forbidden.push((child_ids[i].clone(), child_ids[j].clone()));
                    }
                }
                for child in children {
                    result.insert(child.id().clone(), child);
                }
            }
            None => {
                log::warn!("tab {id} could not be split; keeping it whole");
                result.insert(id, tab);
            }
        }
    }

    (result, forbidden)
}

fn split_tab(tab: &Tab, n_surfaces: usize, cfg: &SeparationConfig) -> Option<Vec<Tab>> {
    let rect = tab.rectangle()?;
    let ab = rect.corner(CornerId::B) - rect.corner(CornerId::A);
    let bc = rect.corner(CornerId::C) - rect.corner(CornerId::B);

    let axis = resolve_axis(tab, rect, cfg.split_along)?;

    // Cuts travel along the perpendicular edge.
    let travel: Vec3 = match axis {
        SplitAxis::AlongAb => bc,
        _ => ab,
    };
    let travel_dir = travel.normalized()?;
    let travel_len = travel.length();

    // Sort mounts by their projection along the travel direction.
    let mut projected: Vec<(f64, Mount)> = tab
        .mounts()
        .iter()
        .filter_map(|m| {
            let p = m.global_position(rect)?;
            Some(((p - rect.corner(CornerId::A)).dot(travel_dir), *m))
        })
        .collect();
    if projected.len() < n_surfaces {
        return None;
    }
    projected.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    // Cut ratios: midpoints between consecutive mount groups.
    let per_surface = projected.len() as f64 / n_surfaces as f64;
    let mut ratios = Vec::new();
    for j in 1..n_surfaces {
        let idx = (j as f64 * per_surface) as usize;
        if idx == 0 || idx >= projected.len() {
            continue;
        }
        let split_pos = (projected[idx - 1].0 + projected[idx].0) / 2.0;
        let ratio = (split_pos / travel_len).clamp(0.1, 0.9);
        ratios.push(ratio);
    }
    if ratios.is_empty() {
        return None;
    }
    ratios.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let sub_rects = split_parallel(rect, &ratios, axis, cfg.gap_width)?;

    let mut children: Vec<Tab> = sub_rects
        .into_iter()
        .enumerate()
        .map(|(i, (a, b, c))| {
            let child_rect = Rectangle::from_three_points(a, b, c);
            let mut child = Tab::from_rectangle(tab.id().child(i), child_rect, Vec::new());
            child.set_original_id(tab.id().clone());
            child
        })
        .collect();

    distribute_mounts(&mut children, &projected);
    Some(children)
}

fn resolve_axis(tab: &Tab, rect: &Rectangle, configured: SplitAxis) -> Option<SplitAxis> {
    match configured {
        SplitAxis::AlongAb | SplitAxis::AlongBc => Some(configured),
        SplitAxis::Auto => {
            let ab_dir = rect.ab_direction()?;
            let bc_dir = rect.bc_direction()?;
            let a = rect.corner(CornerId::A);

            let mut along_ab: Vec<f64> = Vec::new();
            let mut along_bc: Vec<f64> = Vec::new();
            for m in tab.mounts() {
                let p = m.global_position(rect)?;
                along_ab.push((p - a).dot(ab_dir));
                along_bc.push((p - a).dot(bc_dir));
            }
            let spread = |v: &[f64]| {
                let lo = v.iter().copied().fold(f64::MAX, f64::min);
                let hi = v.iter().copied().fold(f64::MIN, f64::max);
                hi - lo
            };
            // Cut perpendicular to the direction the mounts spread along.
            if spread(&along_ab) > spread(&along_bc) {
                Some(SplitAxis::AlongBc)
            } else {
                Some(SplitAxis::AlongAb)
            }
        }
    }
}

/// Cut the rectangle into strips at the given ratios, leaving `gap_width`
/// between neighbouring strips. Returns three corners per strip.
fn split_parallel(
    rect: &Rectangle,
    ratios: &[f64],
    axis: SplitAxis,
    gap_width: f64,
) -> Option<Vec<(Point3, Point3, Point3)>> {
    let a = rect.corner(CornerId::A);
    let b = rect.corner(CornerId::B);
    let c = rect.corner(CornerId::C);
    let d = rect.corner(CornerId::D);
    let half_gap = gap_width / 2.0;

    let mut strips = Vec::new();

    match axis {
        SplitAxis::AlongAb => {
            // Strips parallel to AB; cuts travel along BC.
            let bc = c - b;
            let bc_dir = bc.normalized()?;
            let mut prev = 0.0;
            for &ratio in ratios {
                let mut start_a = a + bc * prev;
                let mut start_b = b + bc * prev;
                if prev > 0.0 {
                    start_a = start_a + bc_dir * half_gap;
                    start_b = start_b + bc_dir * half_gap;
                }
                let end_b = b + bc * ratio - bc_dir * half_gap;
                strips.push((start_a, start_b, end_b));
                prev = ratio;
            }
            let start_a = a + bc * prev + bc_dir * half_gap;
            let start_b = b + bc * prev + bc_dir * half_gap;
            strips.push((start_a, start_b, c));
        }
        _ => {
            // Strips parallel to BC; cuts travel along AB.
            let ab = b - a;
            let ab_dir = ab.normalized()?;
            let mut prev = 0.0;
            for &ratio in ratios {
                let mut start_a = a + ab * prev;
                let mut start_d = d + ab * prev;
                if prev > 0.0 {
                    start_a = start_a + ab_dir * half_gap;
                    start_d = start_d + ab_dir * half_gap;
                }
                let end_a = a + ab * ratio - ab_dir * half_gap;
                let end_d = d + ab * ratio - ab_dir * half_gap;
                strips.push((start_a, end_a, end_d));
                prev = ratio;
            }
            let start_a = a + ab * prev + ab_dir * half_gap;
            strips.push((start_a, b, c));
        }
    }

    Some(strips)
}

/// Assign each mount to the sub-tab whose rectangle contains it, with
/// recomputed local coordinates.
fn distribute_mounts(children: &mut [Tab], mounts: &[(f64, Mount)]) {
    for (_, mount) in mounts {
        for child in children.iter_mut() {
            let Some(rect) = child.rectangle() else {
                continue;
            };
            let Some(p) = mount.global_position(rect) else {
                continue;
            };
            let a = rect.corner(CornerId::A);
            let ab = rect.corner(CornerId::B) - a;
            let bc = rect.corner(CornerId::C) - rect.corner(CornerId::B);
            let ab_len_sq = ab.length_squared();
            let bc_len_sq = bc.length_squared();
            if ab_len_sq <= 0.0 || bc_len_sq <= 0.0 {
                continue;
            }
            let u = (p - a).dot(ab) / ab_len_sq;
            let v = (p - a).dot(bc) / bc_len_sq;
            if (-0.01..=1.01).contains(&u) && (-0.01..=1.01).contains(&v) {
                let rect = *rect;
                if let Some(local) = Mount::from_global(&rect, p, mount.radius) {
                    child.push_mount(local);
                }
                break;
            }
        }
    }
}
