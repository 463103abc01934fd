//! Typed identifiers for tabs and perimeter points.
//!
//! Corner labels are a fixed 4-valued enum with an adjacency table instead
//! of string lookups; strategy points (flange/bend) carry the connection
//! they belong to, so a merged perimeter can always be attributed back to
//! its connections.

use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Corners
// ─────────────────────────────────────────────────────────────────────────────

/// One of the four original rectangle corners, in perimeter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CornerId {
    A,
    B,
    C,
    D,
}

impl CornerId {
    pub const ALL: [CornerId; 4] = [CornerId::A, CornerId::B, CornerId::C, CornerId::D];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            CornerId::A => 0,
            CornerId::B => 1,
            CornerId::C => 2,
            CornerId::D => 3,
        }
    }

    /// Next corner along the perimeter (D wraps to A).
    #[must_use]
    pub const fn next(self) -> CornerId {
        match self {
            CornerId::A => CornerId::B,
            CornerId::B => CornerId::C,
            CornerId::C => CornerId::D,
            CornerId::D => CornerId::A,
        }
    }

    /// Previous corner along the perimeter (A wraps to D).
    #[must_use]
    pub const fn prev(self) -> CornerId {
        match self {
            CornerId::A => CornerId::D,
            CornerId::B => CornerId::A,
            CornerId::C => CornerId::B,
            CornerId::D => CornerId::C,
        }
    }

    /// Adjacent on the rectangle perimeter, in either direction.
    #[must_use]
    pub fn is_adjacent(self, other: CornerId) -> bool {
        self.next() == other || other.next() == self
    }
}

impl fmt::Display for CornerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CornerId::A => "A",
            CornerId::B => "B",
            CornerId::C => "C",
            CornerId::D => "D",
        };
        f.write_str(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sides
// ─────────────────────────────────────────────────────────────────────────────

/// Left/right role of a bend or flange point within one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "L",
            Side::Right => "R",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier of a tab.
///
/// Input tabs get plain numeric ids ("0", "1", ...); a split sub-tab or a
/// synthesized intermediate tab joins its parents with an underscore
/// ("0_1"). The textual form keeps ids orderable for deterministic
/// `BTreeMap` iteration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(String);

impl TabId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the intermediate tab bridging two parents.
    #[must_use]
    pub fn join(a: &TabId, b: &TabId) -> Self {
        Self(format!("{}_{}", a.0, b.0))
    }

    /// Id of the i-th sub-tab of a split surface.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        Self(format!("{}_{index}", self.0))
    }

    /// Two tabs are related when one id embeds the other (a split sub-tab
    /// and its parent, or an intermediate tab and either parent). Related
    /// tabs are exempt from the whole-part collision check because they
    /// legitimately touch.
    #[must_use]
    pub fn is_related(&self, other: &TabId) -> bool {
        self.0.contains(other.0.as_str()) || other.0.contains(self.0.as_str())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point keys
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of a strategy-inserted perimeter point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Flange point: where the flat face ends before the bend.
    Flange,
    /// Bend point: on the fold line.
    Bend,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Flange => "FP",
            StrategyKind::Bend => "BP",
        })
    }
}

/// Key of one entry in a tab's ordered perimeter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointKey {
    Corner(CornerId),
    Strategy {
        kind: StrategyKind,
        /// Tab the point lives on.
        owner: TabId,
        /// The other tab of the connection that inserted the point.
        peer: TabId,
        side: Side,
    },
}

impl PointKey {
    #[must_use]
    pub fn flange(owner: &TabId, peer: &TabId, side: Side) -> Self {
        PointKey::Strategy {
            kind: StrategyKind::Flange,
            owner: owner.clone(),
            peer: peer.clone(),
            side,
        }
    }

    #[must_use]
    pub fn bend(owner: &TabId, peer: &TabId, side: Side) -> Self {
        PointKey::Strategy {
            kind: StrategyKind::Bend,
            owner: owner.clone(),
            peer: peer.clone(),
            side,
        }
    }

    #[must_use]
    pub const fn is_corner(&self) -> bool {
        matches!(self, PointKey::Corner(_))
    }

    #[must_use]
    pub const fn corner(&self) -> Option<CornerId> {
        match self {
            PointKey::Corner(c) => Some(*c),
            PointKey::Strategy { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_bend(&self) -> bool {
        matches!(
            self,
            PointKey::Strategy {
                kind: StrategyKind::Bend,
                ..
            }
        )
    }

    /// The peer tab of the connection that inserted this point, if any.
    /// Points from the same connection share the same peer.
    #[must_use]
    pub const fn connection(&self) -> Option<&TabId> {
        match self {
            PointKey::Corner(_) => None,
            PointKey::Strategy { peer, .. } => Some(peer),
        }
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKey::Corner(c) => write!(f, "{c}"),
            PointKey::Strategy {
                kind,
                owner,
                peer,
                side,
            } => write!(f, "{kind}{owner}_{peer}{side}"),
        }
    }
}
