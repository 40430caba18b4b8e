//! Snapshot and sequence data model.

use serde::{Deserialize, Serialize};

use crate::record::ControllerStateRecord;

/// One captured instant of every controller's state, aligned by roster order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Display name; user-editable and not required to be unique.
    #[serde(default)]
    pub name: String,
    pub records: Vec<ControllerStateRecord>,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, records: Vec<ControllerStateRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Number of per-controller records.
    #[inline]
    pub fn arity(&self) -> usize {
        self.records.len()
    }
}

/// A named, ordered list of snapshots played back as a choreography.
///
/// Sequences accepted by the store always hold at least one snapshot; build
/// them with [`Sequence::new`] to keep that true from the start.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sequence {
    pub name: String,
    pub snapshots: Vec<Snapshot>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, first: Snapshot) -> Self {
        Self {
            name: name.into(),
            snapshots: vec![first],
        }
    }

    /// Build from a list of snapshots; `None` when the list is empty.
    pub fn from_snapshots(name: impl Into<String>, snapshots: Vec<Snapshot>) -> Option<Self> {
        if snapshots.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            snapshots,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Validate basic invariants (non-empty, uniform arity matching `arity` when given).
    pub fn validate_basic(&self, arity: Option<usize>) -> Result<(), String> {
        if self.snapshots.is_empty() {
            return Err(format!("sequence '{}' has no snapshots", self.name));
        }
        if let Some(expected) = arity {
            for (i, snap) in self.snapshots.iter().enumerate() {
                if snap.arity() != expected {
                    return Err(format!(
                        "snapshot {i} of '{}' has {} records, expected {expected}",
                        self.name,
                        snap.arity()
                    ));
                }
            }
        }
        Ok(())
    }
}
