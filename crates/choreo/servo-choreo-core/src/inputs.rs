//! Input contracts for the playback engine.
//!
//! Editors and host adapters queue these and hand them to
//! `PlaybackEngine::apply` on the playback thread.

use serde::{Deserialize, Serialize};

use crate::record::ControllerStateRecord;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ChoreoCommand {
    PlaySequence {
        sequence: usize,
    },
    PlaySnapshot {
        sequence: usize,
        snapshot: usize,
    },
    /// Ad hoc pose; not stored anywhere.
    PlayRecords {
        records: Vec<ControllerStateRecord>,
    },
    /// Capture the controllers' state and append it to a sequence.
    TakeSnapshot {
        sequence: usize,
        #[serde(default)]
        name: String,
    },
}
