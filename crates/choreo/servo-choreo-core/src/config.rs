//! Core configuration for servo-choreo-core.

use serde::{Deserialize, Serialize};

/// How the engine treats a snapshot whose record count differs from the live
/// controller count.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArityPolicy {
    /// Restore the first `min(controllers, records)` pairs and keep playing.
    #[default]
    Lenient,
    /// Refuse to play the snapshot.
    Strict,
}

/// Configuration for the playback engine.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display name of the sequence synthesized at setup when the store is empty.
    pub home_sequence_name: String,

    /// Mismatch handling between snapshot records and live controllers.
    pub arity_policy: ArityPolicy,

    /// Maximum events to retain per tick; overflow is dropped.
    pub max_events_per_tick: usize,

    /// Re-issue the current snapshot on the first tick after a load when the
    /// host did not call `resume` itself.
    pub resume_on_first_tick: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_sequence_name: "Home".to_string(),
            arity_policy: ArityPolicy::Lenient,
            max_events_per_tick: 256,
            resume_on_first_tick: true,
        }
    }
}
