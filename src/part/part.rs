//! Assembled parts.

use std::collections::BTreeMap;

use super::ids::TabId;
use super::tab::Tab;

/// A complete, merged assembly: one tab per identifier plus the connection
/// sequence it was built from. Only the part assembler constructs these;
/// consumers (visualization, CAD export) read the ordered point sequence
/// and mounts per tab.
#[derive(Debug, Clone)]
pub struct Part {
    tabs: BTreeMap<TabId, Tab>,
    sequence: Vec<(TabId, TabId)>,
}

impl Part {
    #[must_use]
    pub fn new(tabs: BTreeMap<TabId, Tab>, sequence: Vec<(TabId, TabId)>) -> Self {
        Self { tabs, sequence }
    }

    #[must_use]
    pub const fn tabs(&self) -> &BTreeMap<TabId, Tab> {
        &self.tabs
    }

    #[must_use]
    pub fn tab(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.get(id)
    }

    #[must_use]
    pub fn sequence(&self) -> &[(TabId, TabId)] {
        &self.sequence
    }

    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}
