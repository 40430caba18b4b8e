//! Servo Choreography Core (engine-agnostic)
//!
//! Records controller states into named snapshots, assembles snapshots into
//! ordered sequences, and plays them back one snapshot at a time. Playback is
//! polled: the host calls [`PlaybackEngine::tick`] once per frame and the
//! engine advances only when every controller reports it has settled.
//!
//! The crate defines the controller contract, typed state records, the
//! sequence store with its edit operations, a capture recorder, the playback
//! state machine and a versioned save format. Actuator kinematics, physics and
//! GUI live in the host.

pub mod capability;
pub mod config;
pub mod controller;
pub mod data;
pub mod engine;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod persist;
pub mod record;
pub mod recorder;
pub mod store;

// Re-exports for consumers (adapters)
pub use capability::{Capability, CapabilitySet};
pub use config::{ArityPolicy, Config};
pub use controller::{take_snapshot, Controller, ControllerSet};
pub use data::{Sequence, Snapshot};
pub use engine::{PlaybackEngine, PlaybackMode, PlaybackStatus};
pub use error::ChoreoError;
pub use ids::{ControllerId, ControllerIdentity, SequenceKey, SnapshotKey};
pub use inputs::ChoreoCommand;
pub use outputs::{ChoreoEvent, Outputs};
pub use persist::{parse_saved_manager_json, SavedManager, SCHEMA_VERSION};
pub use record::{ControllerKind, ControllerStateRecord, Primitive};
pub use recorder::Recorder;
pub use store::{SequenceStore, HOME_INDEX};

/// Choreography result type
pub type Result<T> = core::result::Result<T, ChoreoError>;
