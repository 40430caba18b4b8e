use bevy::log::{debug, error, info, warn};
use bevy::prelude::*;
use servo_choreo_core::{Controller, ControllerSet};

use crate::components::ServoActuator;
use crate::resources::{ChoreoEngine, ChoreoNotice, ChoreoRequest, ChoreoStatus};

/// Fixed timestep: register the roster when it changes, apply queued requests,
/// tick the engine and forward its events.
pub fn drive_choreography_system(
    mut engine: ResMut<ChoreoEngine>,
    mut actuators: Query<&mut ServoActuator>,
    mut requests: EventReader<ChoreoRequest>,
    mut notices: EventWriter<ChoreoNotice>,
    mut status: ResMut<ChoreoStatus>,
) {
    let mut slots: Vec<Mut<ServoActuator>> = actuators.iter_mut().collect();
    slots.sort_by_cached_key(|a| a.controller.identity());
    let mut set: Vec<&mut (dyn Controller + Send + Sync + 'static)> =
        slots.iter_mut().map(|a| &mut *a.controller).collect();

    let engine = &mut engine.0;
    if !set.is_empty() && set.identities() != engine.roster() {
        match engine.setup(&set) {
            Ok(true) => info!("choreo: created home sequence for {} actuators", set.len()),
            Ok(false) => debug!("choreo: roster updated ({} actuators)", set.len()),
            Err(err) => error!("choreo: setup failed: {err}"),
        }
    }

    for ChoreoRequest(command) in requests.read() {
        if let Err(err) = engine.apply(command.clone(), &mut set) {
            warn!("choreo: {} request rejected: {err}", err.category());
        }
    }

    let outputs = engine.tick(&mut set);
    for event in &outputs.events {
        notices.send(ChoreoNotice(event.clone()));
    }
    status.0 = engine.current_state();
}
