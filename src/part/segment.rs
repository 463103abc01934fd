//! Candidate connection geometries.
//!
//! A segment is one way to join a pair of tabs: the two modified source
//! tabs plus, for zero-bend and two-bend strategies, a synthesized
//! intermediate tab. Segments own deep copies of their tabs so sibling
//! candidates and the source tabs never alias.

use crate::geom::Tolerance;

use super::ids::TabId;
use super::tab::Tab;

#[derive(Debug, Clone)]
pub struct Segment {
    /// The connected pair, as given by the topology.
    pub pair: (TabId, TabId),
    pub tab_x: Tab,
    /// Intermediate bridging tab, when the strategy synthesizes one.
    pub tab_y: Option<Tab>,
    pub tab_z: Tab,
}

impl Segment {
    #[must_use]
    pub fn new(pair: (TabId, TabId), tab_x: Tab, tab_z: Tab) -> Self {
        Self {
            pair,
            tab_x,
            tab_y: None,
            tab_z,
        }
    }

    #[must_use]
    pub fn with_intermediate(mut self, tab_y: Tab) -> Self {
        self.tab_y = Some(tab_y);
        self
    }

    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        [Some(&self.tab_x), self.tab_y.as_ref(), Some(&self.tab_z)]
            .into_iter()
            .flatten()
    }

    /// Number of tabs in this candidate (2, or 3 with an intermediate).
    #[must_use]
    pub fn tab_count(&self) -> usize {
        if self.tab_y.is_some() { 3 } else { 2 }
    }

    /// Geometric equality on the strategy points, ignoring key naming.
    /// Used to de-duplicate zero-bend candidates that differ only in which
    /// directed edge produced them.
    #[must_use]
    pub fn geometrically_eq(&self, other: &Segment) -> bool {
        let points_of = |seg: &Segment| {
            seg.tabs()
                .flat_map(|tab| {
                    tab.points()
                        .iter()
                        .filter(|(k, _)| !k.is_corner())
                        .map(|(_, p)| *p)
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        };

        let a = points_of(self);
        let b = points_of(other);
        if a.len() != b.len() {
            return false;
        }
        a.iter().all(|p| {
            b.iter()
                .any(|q| Tolerance::COINCIDENT.approx_eq_point3(*p, *q))
        })
    }
}
