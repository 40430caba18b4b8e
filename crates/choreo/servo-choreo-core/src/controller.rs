//! Controller contract consumed by the playback engine.
//!
//! Controllers are owned by the host. Every engine call borrows them through a
//! [`ControllerSet`], which fixes their order for that call; the host must keep
//! that order stable for one playback session (sort by [`ControllerIdentity`]).

use crate::capability::CapabilitySet;
use crate::data::Snapshot;
use crate::error::ChoreoError;
use crate::ids::ControllerIdentity;
use crate::record::ControllerStateRecord;

/// A single actuator able to snapshot, restore and report motion.
///
/// Contract:
/// - `take_snapshot` is a pure read, callable at any time.
/// - `restore_from_snapshot` starts a transition toward the record (or applies it
///   at once) and returns immediately. Calling it again with the same record
///   mid-transition must not change where the controller settles.
/// - `is_moving` must become false a finite number of ticks after a restore.
///   A controller that never settles stalls sequence playback indefinitely.
pub trait Controller {
    fn identity(&self) -> ControllerIdentity;

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::snapshot_only()
    }

    fn take_snapshot(&self) -> ControllerStateRecord;

    fn restore_from_snapshot(&mut self, record: &ControllerStateRecord);

    fn is_moving(&self) -> bool;
}

impl<T: Controller + ?Sized> Controller for &mut T {
    fn identity(&self) -> ControllerIdentity {
        (**self).identity()
    }
    fn capabilities(&self) -> CapabilitySet {
        (**self).capabilities()
    }
    fn take_snapshot(&self) -> ControllerStateRecord {
        (**self).take_snapshot()
    }
    fn restore_from_snapshot(&mut self, record: &ControllerStateRecord) {
        (**self).restore_from_snapshot(record)
    }
    fn is_moving(&self) -> bool {
        (**self).is_moving()
    }
}

impl<T: Controller + ?Sized> Controller for Box<T> {
    fn identity(&self) -> ControllerIdentity {
        (**self).identity()
    }
    fn capabilities(&self) -> CapabilitySet {
        (**self).capabilities()
    }
    fn take_snapshot(&self) -> ControllerStateRecord {
        (**self).take_snapshot()
    }
    fn restore_from_snapshot(&mut self, record: &ControllerStateRecord) {
        (**self).restore_from_snapshot(record)
    }
    fn is_moving(&self) -> bool {
        (**self).is_moving()
    }
}

/// Ordered, host-owned list of controllers handed to the engine per call.
pub trait ControllerSet {
    fn len(&self) -> usize;

    fn controller(&self, index: usize) -> Option<&dyn Controller>;

    fn controller_mut(&mut self, index: usize) -> Option<&mut dyn Controller>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identities in set order.
    fn identities(&self) -> Vec<ControllerIdentity> {
        (0..self.len())
            .filter_map(|i| self.controller(i).map(|c| c.identity()))
            .collect()
    }

    /// True while any controller is mid-transition.
    fn any_moving(&self) -> bool {
        (0..self.len()).any(|i| self.controller(i).is_some_and(|c| c.is_moving()))
    }
}

impl<C: Controller> ControllerSet for Vec<C> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn controller(&self, index: usize) -> Option<&dyn Controller> {
        self.get(index).map(|c| c as &dyn Controller)
    }

    fn controller_mut(&mut self, index: usize) -> Option<&mut dyn Controller> {
        self.get_mut(index).map(|c| c as &mut dyn Controller)
    }
}

/// Query every controller in order for its current state.
pub fn take_snapshot(
    controllers: &dyn ControllerSet,
    name: impl Into<String>,
) -> Result<Snapshot, ChoreoError> {
    if controllers.is_empty() {
        return Err(ChoreoError::ControllerUnavailable);
    }
    let records = (0..controllers.len())
        .filter_map(|i| controllers.controller(i).map(|c| c.take_snapshot()))
        .collect();
    Ok(Snapshot::new(name, records))
}
