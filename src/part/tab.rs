//! Tabs: planar sheet-metal surfaces with an ordered perimeter.
//!
//! The perimeter is an ordered sequence of `(PointKey, Point3)` pairs with
//! an auxiliary index map for O(1) key lookup. Bend strategies splice
//! flange/bend runs between two corners or remove a corner whose edges are
//! fully consumed; read circularly, the sequence must stay a simple closed
//! polygon. `Clone` is a structural deep copy, which is what lets search
//! branches mutate their own tabs freely.

use std::collections::HashMap;

use crate::geom::{BBox, Plane, Point3};

use super::ids::{CornerId, PointKey, TabId};
use super::mount::Mount;
use super::rect::Rectangle;

#[derive(Debug, Clone)]
pub struct Tab {
    id: TabId,
    points: Vec<(PointKey, Point3)>,
    index: HashMap<PointKey, usize>,
    /// The original input rectangle. Synthesized intermediate tabs have none.
    rectangle: Option<Rectangle>,
    mounts: Vec<Mount>,
    /// Id of the surface this tab was split from, if any.
    original_id: Option<TabId>,
}

impl Tab {
    /// Tab over an input rectangle; the perimeter starts as the four
    /// corners in order.
    #[must_use]
    pub fn from_rectangle(id: TabId, rectangle: Rectangle, mounts: Vec<Mount>) -> Self {
        let points: Vec<(PointKey, Point3)> = CornerId::ALL
            .iter()
            .map(|&c| (PointKey::Corner(c), rectangle.corner(c)))
            .collect();
        let mut tab = Self {
            id,
            points,
            index: HashMap::new(),
            rectangle: Some(rectangle),
            mounts,
            original_id: None,
        };
        tab.rebuild_index();
        tab
    }

    /// Synthesized intermediate tab (zero-bend bridge, two-bend middle tab).
    #[must_use]
    pub fn intermediate(id: TabId, points: Vec<(PointKey, Point3)>) -> Self {
        let mut tab = Self {
            id,
            points,
            index: HashMap::new(),
            rectangle: None,
            mounts: Vec::new(),
            original_id: None,
        };
        tab.rebuild_index();
        tab
    }

    #[must_use]
    pub const fn id(&self) -> &TabId {
        &self.id
    }

    pub fn set_id(&mut self, id: TabId) {
        self.id = id;
    }

    #[must_use]
    pub const fn original_id(&self) -> Option<&TabId> {
        self.original_id.as_ref()
    }

    pub fn set_original_id(&mut self, id: TabId) {
        self.original_id = Some(id);
    }

    #[must_use]
    pub const fn rectangle(&self) -> Option<&Rectangle> {
        self.rectangle.as_ref()
    }

    #[must_use]
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    pub fn push_mount(&mut self, mount: Mount) {
        self.mounts.push(mount);
    }

    #[must_use]
    pub fn points(&self) -> &[(PointKey, Point3)] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn coords(&self) -> Vec<Point3> {
        self.points.iter().map(|(_, p)| *p).collect()
    }

    #[must_use]
    pub fn get(&self, key: &PointKey) -> Option<Point3> {
        self.index.get(key).map(|&i| self.points[i].1)
    }

    #[must_use]
    pub fn position(&self, key: &PointKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[must_use]
    pub fn corner(&self, id: CornerId) -> Option<Point3> {
        self.get(&PointKey::Corner(id))
    }

    /// Coordinates of the four original corners (from the rectangle when
    /// present, else whatever corners remain on the perimeter).
    #[must_use]
    pub fn corner_coords(&self) -> Vec<Point3> {
        match &self.rectangle {
            Some(rect) => rect.corners().to_vec(),
            None => self
                .points
                .iter()
                .filter(|(k, _)| k.is_corner())
                .map(|(_, p)| *p)
                .collect(),
        }
    }

    #[must_use]
    pub fn centroid(&self) -> Option<Point3> {
        Point3::centroid(&self.corner_coords())
    }

    /// Axis-aligned bounds of the original corners.
    #[must_use]
    pub fn corner_bounds(&self) -> Option<BBox> {
        BBox::from_points(&self.corner_coords())
    }

    /// Supporting plane: exact from the rectangle, best-fit otherwise.
    #[must_use]
    pub fn plane(&self) -> Option<Plane> {
        match &self.rectangle {
            Some(rect) => rect.plane(),
            None => Plane::best_fit(&self.coords()),
        }
    }

    /// Keys of all strategy (non-corner) points in perimeter order.
    #[must_use]
    pub fn strategy_keys(&self) -> Vec<&PointKey> {
        self.points
            .iter()
            .map(|(k, _)| k)
            .filter(|k| !k.is_corner())
            .collect()
    }

    /// Insert a run of points immediately after `anchor`.
    /// Returns false (and leaves the tab untouched) when the anchor is
    /// missing or any inserted key already exists.
    pub fn insert_after(&mut self, anchor: &PointKey, run: Vec<(PointKey, Point3)>) -> bool {
        let Some(pos) = self.position(anchor) else {
            return false;
        };
        if run.iter().any(|(k, _)| self.index.contains_key(k)) {
            return false;
        }
        self.points.splice(pos + 1..pos + 1, run);
        self.rebuild_index();
        true
    }

    /// Remove a point by key. Returns false when the key is missing.
    pub fn remove(&mut self, key: &PointKey) -> bool {
        let Some(pos) = self.position(key) else {
            return false;
        };
        self.points.remove(pos);
        self.rebuild_index();
        true
    }

    /// Splice a strategy run onto the directed edge `from → to`.
    ///
    /// When the directed edge runs with the perimeter the run is inserted
    /// after `from` in the given order; when it runs against the perimeter
    /// the run is inserted after `to` in reverse, which also handles the
    /// wrap-around edge between the last and first corners.
    pub fn insert_edge_run(
        &mut self,
        from: CornerId,
        to: CornerId,
        run: Vec<(PointKey, Point3)>,
    ) -> bool {
        if from.next() == to {
            self.insert_after(&PointKey::Corner(from), run)
        } else if to.next() == from {
            let reversed: Vec<_> = run.into_iter().rev().collect();
            self.insert_after(&PointKey::Corner(to), reversed)
        } else {
            false
        }
    }

    /// A copy of this tab with a replacement perimeter. Rectangle, mounts
    /// and ids carry over; the merge machinery uses this to materialize a
    /// reconciled point sequence.
    #[must_use]
    pub fn with_points(&self, points: Vec<(PointKey, Point3)>) -> Self {
        let mut tab = Self {
            id: self.id.clone(),
            points,
            index: HashMap::new(),
            rectangle: self.rectangle,
            mounts: self.mounts.clone(),
            original_id: self.original_id.clone(),
        };
        tab.rebuild_index();
        tab
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .points
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::ids::Side;

    fn sample_tab() -> Tab {
        let rect = Rectangle::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(50.0, 30.0, 0.0),
        );
        Tab::from_rectangle(TabId::new("0"), rect, Vec::new())
    }

    fn run(owner: &TabId, peer: &TabId) -> Vec<(PointKey, Point3)> {
        vec![
            (
                PointKey::flange(owner, peer, Side::Left),
                Point3::new(10.0, -5.0, 0.0),
            ),
            (
                PointKey::bend(owner, peer, Side::Left),
                Point3::new(10.0, -10.0, 0.0),
            ),
            (
                PointKey::bend(owner, peer, Side::Right),
                Point3::new(40.0, -10.0, 0.0),
            ),
            (
                PointKey::flange(owner, peer, Side::Right),
                Point3::new(40.0, -5.0, 0.0),
            ),
        ]
    }

    #[test]
    fn perimeter_starts_as_corners() {
        let tab = sample_tab();
        assert_eq!(tab.len(), 4);
        assert!(tab.points().iter().all(|(k, _)| k.is_corner()));
        assert_eq!(tab.corner(CornerId::A), Some(Point3::ORIGIN));
    }

    #[test]
    fn forward_edge_run_inserts_after_left_corner() {
        let mut tab = sample_tab();
        let peer = TabId::new("1");
        assert!(tab.insert_edge_run(CornerId::A, CornerId::B, run(&tab.id().clone(), &peer)));
        let keys: Vec<String> = tab.points().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["A", "FP0_1L", "BP0_1L", "BP0_1R", "FP0_1R", "B", "C", "D"]);
    }

    #[test]
    fn reversed_edge_run_inserts_after_right_corner_reversed() {
        let mut tab = sample_tab();
        let peer = TabId::new("1");
        // Directed edge B→A runs against the perimeter.
        assert!(tab.insert_edge_run(CornerId::B, CornerId::A, run(&tab.id().clone(), &peer)));
        let keys: Vec<String> = tab.points().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["A", "FP0_1R", "BP0_1R", "BP0_1L", "FP0_1L", "B", "C", "D"]);
    }

    #[test]
    fn wraparound_edge_run() {
        let mut tab = sample_tab();
        let peer = TabId::new("1");
        // D→A is the wrap-around edge; the run lands after D.
        assert!(tab.insert_edge_run(CornerId::D, CornerId::A, run(&tab.id().clone(), &peer)));
        let keys: Vec<String> = tab.points().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["A", "B", "C", "D", "FP0_1L", "BP0_1L", "BP0_1R", "FP0_1R"]);
    }

    #[test]
    fn remove_and_lookup() {
        let mut tab = sample_tab();
        assert!(tab.remove(&PointKey::Corner(CornerId::C)));
        assert_eq!(tab.len(), 3);
        assert!(tab.corner(CornerId::C).is_none());
        assert!(tab.position(&PointKey::Corner(CornerId::D)).is_some());
        assert!(!tab.remove(&PointKey::Corner(CornerId::C)));
    }

    #[test]
    fn clone_is_independent() {
        let mut tab = sample_tab();
        let snapshot = tab.clone();
        let peer = TabId::new("1");
        tab.insert_edge_run(CornerId::A, CornerId::B, run(&tab.id().clone(), &peer));
        assert_eq!(snapshot.len(), 4);
        assert_eq!(tab.len(), 8);
    }
}
