//! Bevy adapter for the servo choreography engine.
//!
//! Spawn entities with [`ServoActuator`], send [`ChoreoRequest`] events and
//! read [`ChoreoNotice`] events. Playback advances once per `FixedUpdate`.

use bevy::prelude::*;
use servo_choreo_core::{Config, PlaybackEngine};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::ServoActuator;
pub use resources::{ChoreoEngine, ChoreoNotice, ChoreoRequest, ChoreoStatus};

/// Systems that poll actuators and advance playback. Order actuator motion
/// `.before(ChoreoSystems)` so the engine sees this frame's movement.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChoreoSystems;

#[derive(Default)]
pub struct ServoChoreoPlugin {
    pub config: Config,
}

impl Plugin for ServoChoreoPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ChoreoEngine(PlaybackEngine::new(self.config.clone())))
            .init_resource::<ChoreoStatus>()
            .add_event::<ChoreoRequest>()
            .add_event::<ChoreoNotice>()
            .add_systems(
                FixedUpdate,
                systems::drive_choreography_system.in_set(ChoreoSystems),
            );
    }
}
