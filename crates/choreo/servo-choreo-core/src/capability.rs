//! Declared controller capabilities.
//!
//! Controllers state what they support when they are built; the engine and
//! hosts query the set instead of inspecting concrete types.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Can take and restore state records. Required for playback.
    Snapshot,
    Rotation,
    Translation,
    Light,
    Magnet,
    Tracking,
    Camera,
    Hover,
    PropSpin,
    Airpark,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    caps: HashSet<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding only `Capability::Snapshot`.
    pub fn snapshot_only() -> Self {
        Self::from_iter([Capability::Snapshot])
    }

    pub fn with(mut self, cap: Capability) -> Self {
        self.caps.insert(cap);
        self
    }

    pub fn insert(&mut self, cap: Capability) -> bool {
        self.caps.insert(cap)
    }

    #[inline]
    pub fn contains(&self, cap: Capability) -> bool {
        self.caps.contains(&cap)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.caps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.caps.iter()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            caps: iter.into_iter().collect(),
        }
    }
}
