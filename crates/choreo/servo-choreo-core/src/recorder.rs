//! Sequence recorder for the editor's capture flow.
//!
//! Usage:
//! ```ignore
//! let mut rec = Recorder::begin("Deploy arm");
//! rec.capture(&controllers, "folded")?;
//! // ... host moves the servos ...
//! rec.capture(&controllers, "extended")?;
//! let index = rec.commit(engine.store_mut())?;
//! ```

use crate::controller::{take_snapshot, ControllerSet};
use crate::data::{Sequence, Snapshot};
use crate::error::ChoreoError;
use crate::store::SequenceStore;

/// Draft sequence built one capture at a time.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    name: String,
    draft: Vec<Snapshot>,
}

impl Recorder {
    pub fn begin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            draft: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn captured(&self) -> &[Snapshot] {
        &self.draft
    }

    /// Append the controllers' current state. Returns the capture's position in the draft.
    pub fn capture(
        &mut self,
        controllers: &dyn ControllerSet,
        snapshot_name: impl Into<String>,
    ) -> Result<usize, ChoreoError> {
        let snap = take_snapshot(controllers, snapshot_name)?;
        self.draft.push(snap);
        Ok(self.draft.len() - 1)
    }

    pub fn undo_last(&mut self) -> Option<Snapshot> {
        self.draft.pop()
    }

    /// Validate the draft and append it to the store. The recorder is consumed
    /// only on success; a rejected draft is handed back untouched.
    pub fn commit(self, store: &mut SequenceStore) -> Result<usize, (Self, ChoreoError)> {
        let Some(sequence) = Sequence::from_snapshots(self.name.clone(), self.draft.clone()) else {
            let err = ChoreoError::invalid_edit(format!("recording '{}' is empty", self.name));
            return Err((self, err));
        };
        store.push_sequence(sequence).map_err(|err| (self, err))
    }

    /// Drop every capture.
    pub fn discard(self) {}
}
