//! Scripted controllers and a tick rig.
//!
//! A [`MockController`] reports moving for exactly `settle_ticks` rig steps
//! after every restore, then lands on the requested state. [`step`] advances
//! every mock once and then ticks the engine, the order a host frame runs in.

use servo_choreo_core::{
    CapabilitySet, ChoreoEvent, Controller, ControllerId, ControllerIdentity, ControllerKind,
    ControllerStateRecord, PlaybackEngine,
};

/// Group tag used by [`rig`].
pub const RIG_GROUP: &str = "rig";

#[derive(Clone, Debug)]
pub struct MockController {
    identity: ControllerIdentity,
    capabilities: CapabilitySet,
    settle_ticks: u32,
    state: ControllerStateRecord,
    target: Option<ControllerStateRecord>,
    remaining: u32,
    restores: Vec<ControllerStateRecord>,
}

impl MockController {
    pub fn new(
        identity: ControllerIdentity,
        initial: ControllerStateRecord,
        settle_ticks: u32,
    ) -> Self {
        Self {
            identity,
            capabilities: CapabilitySet::snapshot_only(),
            settle_ticks,
            state: initial,
            target: None,
            remaining: 0,
            restores: Vec::new(),
        }
    }

    /// Rotation servo resting at 0°.
    pub fn rotation(id: u32, settle_ticks: u32) -> Self {
        Self::new(
            ControllerIdentity::new(RIG_GROUP, ControllerId(id), ControllerKind::Rotation),
            ControllerStateRecord::rotation(0.0),
            settle_ticks,
        )
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// One host frame of motion.
    pub fn advance(&mut self) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            if let Some(target) = self.target.take() {
                self.state = target;
            }
        }
    }

    /// Put the controller somewhere by hand, as a player would.
    pub fn set_state(&mut self, state: ControllerStateRecord) {
        self.state = state;
    }

    /// Last settled state.
    pub fn state(&self) -> &ControllerStateRecord {
        &self.state
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining
    }

    /// Every record handed to `restore_from_snapshot`, in call order.
    pub fn restores(&self) -> &[ControllerStateRecord] {
        &self.restores
    }

    pub fn last_restore(&self) -> Option<&ControllerStateRecord> {
        self.restores.last()
    }
}

impl Controller for MockController {
    fn identity(&self) -> ControllerIdentity {
        self.identity.clone()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities.clone()
    }

    fn take_snapshot(&self) -> ControllerStateRecord {
        self.state.clone()
    }

    fn restore_from_snapshot(&mut self, record: &ControllerStateRecord) {
        self.restores.push(record.clone());
        // Same target mid-transition: keep the countdown already running.
        if self.remaining > 0 && self.target.as_ref() == Some(record) {
            return;
        }
        if self.settle_ticks == 0 {
            self.state = record.clone();
            self.target = None;
            self.remaining = 0;
        } else {
            self.target = Some(record.clone());
            self.remaining = self.settle_ticks;
        }
    }

    fn is_moving(&self) -> bool {
        self.remaining > 0
    }
}

/// Rotation mocks with ids `0..n`, one per entry of `settle_ticks`.
pub fn rig(settle_ticks: &[u32]) -> Vec<MockController> {
    settle_ticks
        .iter()
        .enumerate()
        .map(|(i, k)| MockController::rotation(i as u32, *k))
        .collect()
}

/// Advance every mock once, then tick the engine. Returns the tick's events.
pub fn step(
    engine: &mut PlaybackEngine,
    controllers: &mut Vec<MockController>,
) -> Vec<ChoreoEvent> {
    for c in controllers.iter_mut() {
        c.advance();
    }
    engine.tick(controllers).events.clone()
}

/// Step until the engine is idle. Returns the number of steps taken, or
/// `None` if it was still playing after `max_ticks`.
pub fn run_until_idle(
    engine: &mut PlaybackEngine,
    controllers: &mut Vec<MockController>,
    max_ticks: usize,
) -> Option<usize> {
    for n in 1..=max_ticks {
        step(engine, controllers);
        if !engine.current_state().mode.is_playing() {
            return Some(n);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_settles_after_exact_ticks() {
        let mut m = MockController::rotation(0, 3);
        m.restore_from_snapshot(&ControllerStateRecord::rotation(90.0));
        for _ in 0..2 {
            m.advance();
            assert!(m.is_moving());
        }
        m.advance();
        assert!(!m.is_moving());
        assert_eq!(m.take_snapshot(), ControllerStateRecord::rotation(90.0));
    }

    #[test]
    fn repeated_restore_mid_transition_keeps_countdown() {
        let mut m = MockController::rotation(0, 3);
        let rec = ControllerStateRecord::rotation(45.0);
        m.restore_from_snapshot(&rec);
        m.advance();
        m.restore_from_snapshot(&rec);
        assert_eq!(m.remaining_ticks(), 2);
        assert_eq!(m.restores().len(), 2);
    }
}
