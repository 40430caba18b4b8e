//! Versioned save format for the playback engine.
//!
//! ```text
//! {
//!   "schema_version": 1,
//!   "mode": "idle" | "playing_sequence" | "playing_snapshot",
//!   "current_sequence_index": -1,      // -1 when none
//!   "current_snapshot_index": -1,
//!   "roster": [{"group": "...", "id": 0, "kind": "rotation"}],
//!   "sequences": [{"name": "Home", "snapshots": [{"name": "...", "records": [...]}]}]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::data::Sequence;
use crate::engine::PlaybackMode;
use crate::error::ChoreoError;
use crate::ids::ControllerIdentity;

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SavedManager {
    pub schema_version: u32,
    #[serde(default)]
    pub mode: PlaybackMode,
    #[serde(default = "no_index")]
    pub current_sequence_index: i32,
    #[serde(default = "no_index")]
    pub current_snapshot_index: i32,
    /// Identities of the controllers the snapshots were recorded against.
    #[serde(default)]
    pub roster: Vec<ControllerIdentity>,
    pub sequences: Vec<Sequence>,
}

fn no_index() -> i32 {
    -1
}

impl SavedManager {
    #[inline]
    pub fn encode_index(index: Option<usize>) -> i32 {
        index.and_then(|i| i32::try_from(i).ok()).unwrap_or(-1)
    }

    #[inline]
    pub fn decode_index(raw: i32) -> Option<usize> {
        usize::try_from(raw).ok()
    }

    /// Check the schema version, that every sequence is non-empty, and that
    /// the playback indices point inside the saved sequences.
    pub fn validate(&self) -> Result<(), ChoreoError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ChoreoError::UnsupportedSchemaVersion {
                found: self.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        for seq in &self.sequences {
            seq.validate_basic(None)
                .map_err(|reason| ChoreoError::CorruptSave { reason })?;
        }

        let sequence = Self::decode_index(self.current_sequence_index);
        let snapshot = Self::decode_index(self.current_snapshot_index);
        let in_range = |s: usize, i: usize| {
            self.sequences
                .get(s)
                .is_some_and(|seq| i < seq.snapshots.len())
        };
        match (self.mode, sequence, snapshot) {
            (PlaybackMode::PlayingSequence, Some(s), Some(i))
            | (PlaybackMode::PlayingSnapshot, Some(s), Some(i)) => {
                if !in_range(s, i) {
                    return Err(ChoreoError::CorruptSave {
                        reason: format!("playback index ({s}, {i}) out of range"),
                    });
                }
            }
            (PlaybackMode::PlayingSequence, _, _) => {
                return Err(ChoreoError::CorruptSave {
                    reason: "sequence playback without indices".into(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, ChoreoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse and validate a save produced by `PlaybackEngine::to_json`.
pub fn parse_saved_manager_json(s: &str) -> Result<SavedManager, ChoreoError> {
    let saved: SavedManager = serde_json::from_str(s)?;
    saved.validate()?;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "schema_version": 1,
            "mode": "playing_sequence",
            "current_sequence_index": 0,
            "current_snapshot_index": 1,
            "sequences": [{
                "name": "Home",
                "snapshots": [
                    {
                        "name": "a",
                        "records": [{"kind": "magnet", "engaged": true, "strength": 1.0}]
                    },
                    {
                        "name": "b",
                        "records": [{"kind": "magnet", "engaged": false, "strength": 1.0}]
                    }
                ]
            }]
        })
    }

    #[test]
    fn accepts_valid_save_with_defaults() {
        let saved = parse_saved_manager_json(&base().to_string()).unwrap();
        assert_eq!(saved.mode, PlaybackMode::PlayingSequence);
        assert!(saved.roster.is_empty());
        assert_eq!(SavedManager::decode_index(saved.current_snapshot_index), Some(1));
    }

    #[test]
    fn rejects_future_schema() {
        let mut v = base();
        v["schema_version"] = json!(7);
        assert_eq!(
            parse_saved_manager_json(&v.to_string()),
            Err(ChoreoError::UnsupportedSchemaVersion {
                found: 7,
                supported: SCHEMA_VERSION
            })
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut v = base();
        v["current_snapshot_index"] = json!(2);
        assert!(matches!(
            parse_saved_manager_json(&v.to_string()),
            Err(ChoreoError::CorruptSave { .. })
        ));
    }

    #[test]
    fn ad_hoc_snapshot_mode_is_accepted() {
        let mut v = base();
        v["mode"] = json!("playing_snapshot");
        v["current_sequence_index"] = json!(-1);
        v["current_snapshot_index"] = json!(-1);
        assert!(parse_saved_manager_json(&v.to_string()).is_ok());
    }

    #[test]
    fn index_encoding_uses_minus_one_for_none() {
        assert_eq!(SavedManager::encode_index(None), -1);
        assert_eq!(SavedManager::encode_index(Some(3)), 3);
        assert_eq!(SavedManager::decode_index(-1), None);
    }
}
