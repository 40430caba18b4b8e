use bevy::prelude::*;
use servo_choreo_core::Controller;

/// One actuator the choreography engine drives. The plugin gathers every
/// `ServoActuator` each fixed tick and hands them to the engine sorted by
/// identity, so spawn order does not matter.
#[derive(Component)]
pub struct ServoActuator {
    pub controller: Box<dyn Controller + Send + Sync>,
}

impl ServoActuator {
    pub fn new(controller: impl Controller + Send + Sync + 'static) -> Self {
        Self {
            controller: Box::new(controller),
        }
    }
}
