//! Controller identifiers and store handles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::ControllerKind;

/// Host-assigned identifier of one controller (part id, module index, ...).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ControllerId(pub u32);

/// Identity of a controller within a roster.
///
/// The grouping tag keeps controller lists stable across save/reload: hosts
/// sort their controllers by identity before handing them to the engine, and
/// the engine compares the saved roster against the live one on resume.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ControllerIdentity {
    pub group: String,
    pub id: ControllerId,
    pub kind: ControllerKind,
}

impl ControllerIdentity {
    pub fn new(group: impl Into<String>, id: ControllerId, kind: ControllerKind) -> Self {
        Self {
            group: group.into(),
            id,
            kind,
        }
    }
}

/// Store-assigned handle of a sequence. Survives reorders and the removal
/// of other sequences; never reused within one store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SequenceKey(pub(crate) u64);

/// Store-assigned handle of a snapshot within its sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SnapshotKey(pub(crate) u64);

impl fmt::Display for ControllerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.group, self.kind.as_str(), self.id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_order_by_group_then_id() {
        let a = ControllerIdentity::new("arm", ControllerId(3), ControllerKind::Rotation);
        let b = ControllerIdentity::new("arm", ControllerId(7), ControllerKind::Light);
        let c = ControllerIdentity::new("bay", ControllerId(0), ControllerKind::Magnet);
        let mut ids = vec![c.clone(), b.clone(), a.clone()];
        ids.sort();
        assert_eq!(ids, vec![a.clone(), b, c]);
        assert_eq!(a.to_string(), "arm/rotation#3");
    }
}
