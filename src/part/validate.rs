//! Perimeter integrity checks.
//!
//! Catches topology and geometry damage early: a merged tab whose edges
//! cross in some axis projection, or whose corners collapsed onto each
//! other, can never be manufactured and must reject its combination.

use crate::geom::{Tolerance, segments_cross_any_projection};

use super::tab::Tab;

/// Is the perimeter, read circularly, a simple closed polygon?
///
/// Non-adjacent edge pairs are tested for proper crossings in the three
/// axis projections. Strategy points are allowed to coincide with corners
/// (a flange point sits exactly on its corner in several strategies), so
/// only corner/corner coincidences count as duplicates.
#[must_use]
pub fn perimeter_is_simple(tab: &Tab) -> bool {
    let points = tab.points();
    let n = points.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let (ki, pi) = &points[i];
            let (kj, pj) = &points[j];
            if ki.is_corner()
                && kj.is_corner()
                && Tolerance::COINCIDENT.approx_eq_point3(*pi, *pj)
            {
                log::debug!("tab {}: corners {ki} and {kj} coincide", tab.id());
                return false;
            }
        }
    }

    for i in 0..n {
        for j in (i + 2)..n {
            // Skip adjacent pairs and the closing last-to-first edge.
            if i == 0 && j == n - 1 {
                continue;
            }
            let a1 = points[i].1;
            let a2 = points[(i + 1) % n].1;
            let b1 = points[j].1;
            let b2 = points[(j + 1) % n].1;
            if segments_cross_any_projection(a1, a2, b1, b2) {
                log::debug!(
                    "tab {}: edge {}-{} crosses edge {}-{}",
                    tab.id(),
                    points[i].0,
                    points[(i + 1) % n].0,
                    points[j].0,
                    points[(j + 1) % n].0,
                );
                return false;
            }
        }
    }
    true
}
