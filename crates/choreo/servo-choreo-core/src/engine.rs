//! Engine: sequence ownership, roster registration and the tick-driven playback state machine.
//!
//! Methods:
//! - new / from_saved, setup (roster + home sequence), take_snapshot
//! - play_sequence, play_stored_snapshot, play_snapshot, play_records, apply
//! - tick (poll → advance), resume, current_state, save
//!
//! The engine never blocks and never owns controllers: every call borrows the
//! host's ordered [`ControllerSet`]. Playback advances only on `tick`, once
//! every controller reports it is no longer moving.

use hashbrown::HashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::config::{ArityPolicy, Config};
use crate::controller::{self, ControllerSet};
use crate::data::Snapshot;
use crate::error::ChoreoError;
use crate::ids::{ControllerIdentity, SequenceKey, SnapshotKey};
use crate::inputs::ChoreoCommand;
use crate::outputs::{ChoreoEvent, Outputs};
use crate::persist::{SavedManager, SCHEMA_VERSION};
use crate::record::ControllerStateRecord;
use crate::store::SequenceStore;

/// Persisted playback mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Idle,
    PlayingSequence,
    PlayingSnapshot,
}

impl PlaybackMode {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PlayingSequence => "playing_sequence",
            Self::PlayingSnapshot => "playing_snapshot",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Live state for UI display: mode plus the current indices.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub mode: PlaybackMode,
    pub sequence_index: Option<usize>,
    pub snapshot_index: Option<usize>,
}

/// Stored snapshot being played, held by store key so edits cannot retarget it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Cursor {
    sequence: SequenceKey,
    snapshot: SnapshotKey,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Playback {
    Idle,
    /// Waiting for one snapshot to settle. `stored` is `None` for ad hoc poses.
    Snapshot { stored: Option<Cursor> },
    Sequence(Cursor),
}

/// Snapshot/sequence playback engine for one vehicle.
#[derive(Debug)]
pub struct PlaybackEngine {
    cfg: Config,
    store: SequenceStore,

    // Roster registered at setup
    roster: Vec<ControllerIdentity>,
    roster_index: HashMap<ControllerIdentity, usize>,
    saved_roster: Option<Vec<ControllerIdentity>>,

    playback: Playback,
    pending_resume: bool,

    // Events raised since the last tick, then the tick's outputs
    pending: Vec<ChoreoEvent>,
    outputs: Outputs,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl PlaybackEngine {
    /// Create an idle engine with an empty store.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            store: SequenceStore::new(),
            roster: Vec::new(),
            roster_index: HashMap::new(),
            saved_roster: None,
            playback: Playback::Idle,
            pending_resume: false,
            pending: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    /// Editor access to the store. Playback follows moved entries; deleting or
    /// replacing the playing sequence or snapshot stops playback on the next tick.
    #[inline]
    pub fn store_mut(&mut self) -> &mut SequenceStore {
        &mut self.store
    }

    #[inline]
    pub fn roster(&self) -> &[ControllerIdentity] {
        &self.roster
    }

    /// Position of a controller in the registered roster.
    pub fn roster_position(&self, identity: &ControllerIdentity) -> Option<usize> {
        self.roster_index.get(identity).copied()
    }

    /// True after a load until the current snapshot has been re-issued.
    #[inline]
    pub fn resume_pending(&self) -> bool {
        self.pending_resume
    }

    /// Register the controller roster and create the home sequence if the store is empty.
    /// Returns whether the home sequence was created.
    pub fn setup(&mut self, controllers: &dyn ControllerSet) -> Result<bool, ChoreoError> {
        if controllers.is_empty() {
            warn!("setup: no controllers registered");
            self.pending.push(ChoreoEvent::ControllerUnavailable);
            return Err(ChoreoError::ControllerUnavailable);
        }
        for index in 0..controllers.len() {
            let Some(ctrl) = controllers.controller(index) else {
                continue;
            };
            if !ctrl.capabilities().contains(Capability::Snapshot) {
                return Err(ChoreoError::MissingCapability {
                    index,
                    capability: Capability::Snapshot,
                });
            }
        }

        self.register_roster(controllers.identities());
        let name = self.cfg.home_sequence_name.clone();
        let created = self.store.create_home_sequence_if_absent(&name, controllers)?;
        if created {
            debug!("setup: created home sequence '{name}'");
        }
        if !self.pending_resume {
            self.saved_roster = None;
        }
        Ok(created)
    }

    fn register_roster(&mut self, roster: Vec<ControllerIdentity>) {
        self.roster_index = roster
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        self.store.set_expected_arity(Some(roster.len()));
        self.roster = roster;
    }

    /// Capture every controller's current state.
    pub fn take_snapshot(
        &mut self,
        controllers: &dyn ControllerSet,
        name: impl Into<String>,
    ) -> Result<Snapshot, ChoreoError> {
        controller::take_snapshot(controllers, name).inspect_err(|_| {
            warn!("take_snapshot: no controllers available");
            self.pending.push(ChoreoEvent::ControllerUnavailable);
        })
    }

    /// Start playing a stored sequence from its first snapshot. Overrides any playback in flight.
    pub fn play_sequence(
        &mut self,
        sequence: usize,
        controllers: &mut dyn ControllerSet,
    ) -> Result<(), ChoreoError> {
        self.require_controllers(controllers)?;
        let (first, cursor) = self
            .store
            .snapshot(sequence, 0)
            .cloned()
            .zip(self.cursor_at(sequence, 0))
            .ok_or(ChoreoError::SequenceNotFound { index: sequence })?;
        self.check_arity(controllers.len(), &first)?;

        debug!("play_sequence: {sequence}");
        self.pending_resume = false;
        self.playback = Playback::Sequence(cursor);
        self.pending.push(ChoreoEvent::SequenceStarted { sequence });
        self.fan_out(&first, controllers, Some(sequence), Some(0));
        Ok(())
    }

    /// Play one snapshot out of a stored sequence.
    pub fn play_stored_snapshot(
        &mut self,
        sequence: usize,
        snapshot: usize,
        controllers: &mut dyn ControllerSet,
    ) -> Result<(), ChoreoError> {
        self.require_controllers(controllers)?;
        if self.store.get(sequence).is_none() {
            return Err(ChoreoError::SequenceNotFound { index: sequence });
        }
        let snap = self
            .store
            .snapshot(sequence, snapshot)
            .cloned()
            .ok_or(ChoreoError::SnapshotNotFound {
                sequence,
                index: snapshot,
            })?;
        self.start_snapshot(&snap, Some((sequence, snapshot)), controllers)
    }

    /// Play an ad hoc snapshot that is not part of the store.
    pub fn play_snapshot(
        &mut self,
        snapshot: &Snapshot,
        controllers: &mut dyn ControllerSet,
    ) -> Result<(), ChoreoError> {
        self.require_controllers(controllers)?;
        self.start_snapshot(snapshot, None, controllers)
    }

    /// Play an ad hoc list of records.
    pub fn play_records(
        &mut self,
        records: Vec<ControllerStateRecord>,
        controllers: &mut dyn ControllerSet,
    ) -> Result<(), ChoreoError> {
        self.play_snapshot(&Snapshot::new("", records), controllers)
    }

    fn start_snapshot(
        &mut self,
        snap: &Snapshot,
        at: Option<(usize, usize)>,
        controllers: &mut dyn ControllerSet,
    ) -> Result<(), ChoreoError> {
        self.check_arity(controllers.len(), snap)?;
        debug!("play_snapshot: {at:?}");
        self.pending_resume = false;
        self.playback = Playback::Snapshot {
            stored: at.and_then(|(s, i)| self.cursor_at(s, i)),
        };
        self.fan_out(snap, controllers, at.map(|(s, _)| s), at.map(|(_, i)| i));
        Ok(())
    }

    /// Apply a queued command.
    pub fn apply(
        &mut self,
        command: ChoreoCommand,
        controllers: &mut dyn ControllerSet,
    ) -> Result<(), ChoreoError> {
        match command {
            ChoreoCommand::PlaySequence { sequence } => self.play_sequence(sequence, controllers),
            ChoreoCommand::PlaySnapshot { sequence, snapshot } => {
                self.play_stored_snapshot(sequence, snapshot, controllers)
            }
            ChoreoCommand::PlayRecords { records } => self.play_records(records, controllers),
            ChoreoCommand::TakeSnapshot { sequence, name } => {
                let snap = self.take_snapshot(controllers, name)?;
                self.store.push_snapshot(sequence, snap).map(|_| ())
            }
        }
    }

    /// Poll the controllers once and advance playback if they have all settled.
    /// Returns the events raised since the previous tick.
    pub fn tick(&mut self, controllers: &mut dyn ControllerSet) -> &Outputs {
        self.outputs.clear();

        if self.pending_resume && self.cfg.resume_on_first_tick {
            // Resume re-issues the current snapshot; advancing waits for the next tick.
            if self.resume(controllers).is_err() {
                debug!("tick: resume deferred, no controllers");
            }
            return self.flush();
        }

        let playback = self.playback;
        match playback {
            Playback::Idle => {}
            _ if self.pending_resume => {}
            _ if controllers.is_empty() => {
                debug!("tick: playing with no controllers; waiting");
            }
            _ if controllers.any_moving() => {}
            Playback::Snapshot { stored } => {
                debug!("tick: snapshot settled");
                let at = stored.and_then(|c| self.locate(c));
                self.playback = Playback::Idle;
                self.pending.push(ChoreoEvent::SnapshotSettled {
                    sequence: at.map(|(s, _)| s),
                    snapshot: at.map(|(_, i)| i),
                });
            }
            Playback::Sequence(cursor) => {
                self.advance_sequence(cursor, controllers);
            }
        }

        self.flush()
    }

    fn advance_sequence(&mut self, cursor: Cursor, controllers: &mut dyn ControllerSet) {
        let Some(sequence) = self.store.sequence_position(cursor.sequence) else {
            warn!("tick: playing sequence no longer exists; stopping");
            self.abort("the playing sequence was removed".to_string());
            return;
        };
        let Some((_, snapshot)) = self.locate(cursor) else {
            warn!("tick: current snapshot of sequence {sequence} was removed; stopping");
            self.abort(format!("current snapshot of sequence {sequence} was removed"));
            return;
        };
        let len = self.store.get(sequence).map_or(0, |s| s.len());

        let next = snapshot + 1;
        if next >= len {
            debug!("tick: sequence {sequence} finished");
            self.playback = Playback::Idle;
            self.pending.push(ChoreoEvent::SequenceFinished { sequence });
            return;
        }

        let Some((snap, next_cursor)) = self
            .store
            .snapshot(sequence, next)
            .cloned()
            .zip(self.cursor_at(sequence, next))
        else {
            return;
        };
        if self.check_arity(controllers.len(), &snap).is_err() {
            self.playback = Playback::Idle;
            return;
        }
        debug!("tick: sequence {sequence} → snapshot {next}");
        self.playback = Playback::Sequence(next_cursor);
        self.fan_out(&snap, controllers, Some(sequence), Some(next));
    }

    /// Re-issue the restore fan-out for the current snapshot after a load.
    /// Does nothing unless a resume is pending.
    pub fn resume(&mut self, controllers: &mut dyn ControllerSet) -> Result<(), ChoreoError> {
        if !self.pending_resume {
            return Ok(());
        }
        self.require_controllers(controllers)?;

        let live = controllers.identities();
        if let Some(saved) = self.saved_roster.take() {
            if saved != live {
                warn!(
                    "resume: roster changed ({} saved, {} live)",
                    saved.len(),
                    live.len()
                );
                self.pending.push(ChoreoEvent::RosterChanged {
                    saved,
                    live: live.clone(),
                });
            }
        }
        self.register_roster(live);
        self.pending_resume = false;

        let target = match self.playback {
            Playback::Idle | Playback::Snapshot { stored: None } => None,
            Playback::Snapshot { stored: Some(c) } | Playback::Sequence(c) => Some(c),
        };
        let Some(cursor) = target else {
            self.playback = Playback::Idle;
            return Ok(());
        };
        let Some((sequence, snapshot)) = self.locate(cursor) else {
            self.abort("the saved snapshot was removed before resume".to_string());
            return Ok(());
        };
        let Some(snap) = self.store.snapshot(sequence, snapshot).cloned() else {
            self.abort(format!("snapshot {snapshot} of sequence {sequence} is missing"));
            return Ok(());
        };

        info!("resume: sequence {sequence}, snapshot {snapshot}");
        if self.check_arity(controllers.len(), &snap).is_err() {
            self.playback = Playback::Idle;
            return Ok(());
        }
        self.pending.push(ChoreoEvent::PlaybackResumed {
            sequence: Some(sequence),
            snapshot: Some(snapshot),
        });
        self.fan_out(&snap, controllers, Some(sequence), Some(snapshot));
        Ok(())
    }

    /// Current mode and indices for UI display. A sequence whose current
    /// snapshot was edited away reads as idle; the next tick makes it so.
    pub fn current_state(&self) -> PlaybackStatus {
        let (mode, sequence_index, snapshot_index) = match self.playback {
            Playback::Idle => (PlaybackMode::Idle, None, None),
            Playback::Snapshot { stored } => {
                let at = stored.and_then(|c| self.locate(c));
                (
                    PlaybackMode::PlayingSnapshot,
                    at.map(|(s, _)| s),
                    at.map(|(_, i)| i),
                )
            }
            Playback::Sequence(cursor) => match self.locate(cursor) {
                Some((s, i)) => (PlaybackMode::PlayingSequence, Some(s), Some(i)),
                None => (PlaybackMode::Idle, None, None),
            },
        };
        PlaybackStatus {
            mode,
            sequence_index,
            snapshot_index,
        }
    }

    // ---- persistence ----

    /// Capture the persisted state: mode, indices, roster and sequences.
    pub fn save(&self) -> SavedManager {
        let status = self.current_state();
        let roster = self
            .saved_roster
            .clone()
            .unwrap_or_else(|| self.roster.clone());
        SavedManager {
            schema_version: SCHEMA_VERSION,
            mode: status.mode,
            current_sequence_index: SavedManager::encode_index(status.sequence_index),
            current_snapshot_index: SavedManager::encode_index(status.snapshot_index),
            roster,
            sequences: self.store.sequences().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, ChoreoError> {
        self.save().to_json_string()
    }

    /// Rebuild an engine from a save. Playback resumes on `resume` (or the first tick).
    pub fn from_saved(saved: SavedManager, cfg: Config) -> Result<Self, ChoreoError> {
        saved.validate()?;
        let sequence = SavedManager::decode_index(saved.current_sequence_index);
        let snapshot = SavedManager::decode_index(saved.current_snapshot_index);

        let mut engine = Self::new(cfg);
        engine.store = SequenceStore::from_sequences(saved.sequences)?;
        let cursor = sequence
            .zip(snapshot)
            .and_then(|(s, i)| engine.cursor_at(s, i));
        let playback = match (saved.mode, cursor) {
            (PlaybackMode::PlayingSequence, Some(c)) => Playback::Sequence(c),
            (PlaybackMode::PlayingSnapshot, Some(c)) => Playback::Snapshot { stored: Some(c) },
            (PlaybackMode::PlayingSnapshot, None) => {
                info!("load: ad hoc snapshot playback cannot be resumed; starting idle");
                Playback::Idle
            }
            _ => Playback::Idle,
        };

        engine.pending_resume = playback != Playback::Idle;
        engine.playback = playback;
        if !saved.roster.is_empty() {
            engine.register_roster(saved.roster.clone());
            // Only a pending resume compares against the saved roster.
            if engine.pending_resume {
                engine.saved_roster = Some(saved.roster);
            }
        }
        Ok(engine)
    }

    pub fn from_json(s: &str, cfg: Config) -> Result<Self, ChoreoError> {
        let saved = crate::persist::parse_saved_manager_json(s)?;
        Self::from_saved(saved, cfg)
    }

    // ---- internals ----

    fn cursor_at(&self, sequence: usize, snapshot: usize) -> Option<Cursor> {
        Some(Cursor {
            sequence: self.store.sequence_key(sequence)?,
            snapshot: self.store.snapshot_key(sequence, snapshot)?,
        })
    }

    fn locate(&self, cursor: Cursor) -> Option<(usize, usize)> {
        self.store.locate(cursor.sequence, cursor.snapshot)
    }

    fn require_controllers(&mut self, controllers: &dyn ControllerSet) -> Result<(), ChoreoError> {
        if controllers.is_empty() {
            warn!("playback requested with no controllers; ignoring");
            self.pending.push(ChoreoEvent::ControllerUnavailable);
            return Err(ChoreoError::ControllerUnavailable);
        }
        Ok(())
    }

    /// Report a record/controller count mismatch. Only the strict policy refuses.
    fn check_arity(&mut self, controllers: usize, snap: &Snapshot) -> Result<(), ChoreoError> {
        let records = snap.arity();
        if controllers == records {
            return Ok(());
        }
        warn!(
            "snapshot '{}' has {records} records for {controllers} controllers",
            snap.name
        );
        self.pending.push(ChoreoEvent::SnapshotArityMismatch {
            controllers,
            records,
        });
        match self.cfg.arity_policy {
            ArityPolicy::Lenient => Ok(()),
            ArityPolicy::Strict => Err(ChoreoError::SnapshotArityMismatch {
                expected: controllers,
                actual: records,
            }),
        }
    }

    /// Restore each controller from its aligned record, up to the shorter of the two lists.
    fn fan_out(
        &mut self,
        snap: &Snapshot,
        controllers: &mut dyn ControllerSet,
        sequence: Option<usize>,
        snapshot: Option<usize>,
    ) {
        let count = controllers.len().min(snap.arity());
        for (i, record) in snap.records.iter().take(count).enumerate() {
            if let Some(ctrl) = controllers.controller_mut(i) {
                ctrl.restore_from_snapshot(record);
            }
        }
        self.pending.push(ChoreoEvent::SnapshotApplied {
            sequence,
            snapshot,
            restored: count,
        });
    }

    fn abort(&mut self, reason: String) {
        self.playback = Playback::Idle;
        self.pending.push(ChoreoEvent::PlaybackAborted { reason });
    }

    fn flush(&mut self) -> &Outputs {
        let cap = self.cfg.max_events_per_tick;
        let mut events = std::mem::take(&mut self.pending);
        if events.len() > cap {
            warn!("dropping {} events over the per-tick cap", events.len() - cap);
            events.truncate(cap);
        }
        self.outputs.events = events;
        &self.outputs
    }
}
