//! Output contracts from the playback engine.
//!
//! Outputs carry the semantic events produced since the previous tick. Hosts
//! surface them in their live state display; nothing here is fatal.

use serde::{Deserialize, Serialize};

use crate::ids::ControllerIdentity;

/// Discrete semantic signals emitted by play calls and ticks.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChoreoEvent {
    SequenceStarted {
        sequence: usize,
    },
    /// Restore fan-out issued. Indices are `None` for ad hoc snapshots.
    SnapshotApplied {
        sequence: Option<usize>,
        snapshot: Option<usize>,
        restored: usize,
    },
    /// Every controller settled after a single-snapshot play.
    SnapshotSettled {
        sequence: Option<usize>,
        snapshot: Option<usize>,
    },
    SequenceFinished {
        sequence: usize,
    },
    SnapshotArityMismatch {
        controllers: usize,
        records: usize,
    },
    /// Playback re-entered after a load.
    PlaybackResumed {
        sequence: Option<usize>,
        snapshot: Option<usize>,
    },
    /// Live controllers differ from the roster the save was made with.
    RosterChanged {
        saved: Vec<ControllerIdentity>,
        live: Vec<ControllerIdentity>,
    },
    ControllerUnavailable,
    /// Playback dropped to idle because its sequence was edited away.
    PlaybackAborted {
        reason: String,
    },
}

/// Outputs returned by `PlaybackEngine::tick()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<ChoreoEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
