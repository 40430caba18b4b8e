use bevy::prelude::*;
use servo_choreo_core::{ChoreoCommand, ChoreoEvent, PlaybackEngine, PlaybackStatus};

/// The playback engine owned by the app. Hosts edit sequences and save or
/// load through `.0`.
#[derive(Resource)]
pub struct ChoreoEngine(pub PlaybackEngine);

/// Mode and indices after the latest fixed tick, for UI display.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct ChoreoStatus(pub PlaybackStatus);

/// Playback request applied on the next fixed tick, in send order.
#[derive(Event, Clone, Debug)]
pub struct ChoreoRequest(pub ChoreoCommand);

/// Engine event re-emitted into the ECS.
#[derive(Event, Clone, Debug)]
pub struct ChoreoNotice(pub ChoreoEvent);
