//! Sequence store: the ordered list of sequences and its edit operations.
//!
//! Every edit validates against the data-model invariants before touching the
//! list, so a rejected edit leaves the store exactly as it was:
//! - each sequence holds at least one snapshot;
//! - every snapshot has `expected_arity` records once an arity is set;
//! - the home sequence stays at index 0 and cannot be deleted.
//!
//! Alongside the positional list the store keeps a [`SequenceKey`] per
//! sequence and a [`SnapshotKey`] per snapshot. Keys follow their entry
//! through moves and inserts and are dropped with it, so a playback cursor
//! held by key never lands on a different entry after an edit.

use crate::controller::{take_snapshot, ControllerSet};
use crate::data::{Sequence, Snapshot};
use crate::error::ChoreoError;
use crate::ids::{SequenceKey, SnapshotKey};

/// Index of the home sequence.
pub const HOME_INDEX: usize = 0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceStore {
    sequences: Vec<Sequence>,
    // Parallel to `sequences`, one entry per sequence and per snapshot
    keys: Vec<Keys>,
    next_key: u64,
    expected_arity: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
struct Keys {
    sequence: SequenceKey,
    snapshots: Vec<SnapshotKey>,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-validated sequences (used when loading saves).
    pub fn from_sequences(sequences: Vec<Sequence>) -> Result<Self, ChoreoError> {
        for seq in &sequences {
            seq.validate_basic(None)
                .map_err(|reason| ChoreoError::CorruptSave { reason })?;
        }
        let mut store = Self::default();
        for seq in &sequences {
            let keys = store.mint_keys(seq);
            store.keys.push(keys);
        }
        store.sequences = sequences;
        Ok(store)
    }

    #[inline]
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    #[inline]
    pub fn snapshot(&self, sequence: usize, index: usize) -> Option<&Snapshot> {
        self.sequences.get(sequence)?.snapshots.get(index)
    }

    #[inline]
    pub fn sequence_key(&self, index: usize) -> Option<SequenceKey> {
        self.keys.get(index).map(|k| k.sequence)
    }

    #[inline]
    pub fn snapshot_key(&self, sequence: usize, index: usize) -> Option<SnapshotKey> {
        self.keys.get(sequence)?.snapshots.get(index).copied()
    }

    /// Current position of a sequence, or `None` once it has been deleted or replaced.
    pub fn sequence_position(&self, key: SequenceKey) -> Option<usize> {
        self.keys.iter().position(|k| k.sequence == key)
    }

    /// Current `(sequence, snapshot)` position of a keyed snapshot.
    pub fn locate(&self, sequence: SequenceKey, snapshot: SnapshotKey) -> Option<(usize, usize)> {
        let seq = self.sequence_position(sequence)?;
        let snap = self.keys[seq].snapshots.iter().position(|k| *k == snapshot)?;
        Some((seq, snap))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    #[inline]
    pub fn expected_arity(&self) -> Option<usize> {
        self.expected_arity
    }

    /// Fix the record count new snapshots must carry. Existing sequences are
    /// not re-validated: stale saves are handled at playback time.
    pub fn set_expected_arity(&mut self, arity: Option<usize>) {
        self.expected_arity = arity;
    }

    /// Synthesize the home sequence from the controllers' current state when
    /// the store is empty. Returns whether a sequence was created.
    pub fn create_home_sequence_if_absent(
        &mut self,
        name: &str,
        controllers: &dyn ControllerSet,
    ) -> Result<bool, ChoreoError> {
        if !self.sequences.is_empty() {
            return Ok(false);
        }
        let home = Sequence::new(name, take_snapshot(controllers, name)?);
        let keys = self.mint_keys(&home);
        self.keys.insert(HOME_INDEX, keys);
        self.sequences.insert(HOME_INDEX, home);
        Ok(true)
    }

    // ---- sequence edits ----

    pub fn push_sequence(&mut self, sequence: Sequence) -> Result<usize, ChoreoError> {
        self.check_sequence(&sequence)?;
        let keys = self.mint_keys(&sequence);
        self.keys.push(keys);
        self.sequences.push(sequence);
        Ok(self.sequences.len() - 1)
    }

    /// Insert at `index` (`index == len` appends). Index 0 is reserved for home
    /// once the store has sequences.
    pub fn insert_sequence(&mut self, index: usize, sequence: Sequence) -> Result<(), ChoreoError> {
        if index > self.sequences.len() {
            return Err(ChoreoError::invalid_edit(format!(
                "insert index {index} past end ({})",
                self.sequences.len()
            )));
        }
        if index == HOME_INDEX && !self.sequences.is_empty() {
            return Err(ChoreoError::invalid_edit(
                "cannot insert before the home sequence",
            ));
        }
        self.check_sequence(&sequence)?;
        let keys = self.mint_keys(&sequence);
        self.keys.insert(index, keys);
        self.sequences.insert(index, sequence);
        Ok(())
    }

    /// Swap in a new sequence. It gets fresh keys: playback of the old one stops.
    pub fn replace_sequence(
        &mut self,
        index: usize,
        sequence: Sequence,
    ) -> Result<(), ChoreoError> {
        self.check_sequence_index(index)?;
        self.check_sequence(&sequence)?;
        let keys = self.mint_keys(&sequence);
        self.keys[index] = keys;
        self.sequences[index] = sequence;
        Ok(())
    }

    pub fn delete_sequence(&mut self, index: usize) -> Result<Sequence, ChoreoError> {
        self.check_sequence_index(index)?;
        if index == HOME_INDEX {
            return Err(ChoreoError::invalid_edit("the home sequence cannot be deleted"));
        }
        self.keys.remove(index);
        Ok(self.sequences.remove(index))
    }

    /// Move a sequence from `from` to `to`. The home sequence stays pinned.
    pub fn move_sequence(&mut self, from: usize, to: usize) -> Result<(), ChoreoError> {
        self.check_sequence_index(from)?;
        self.check_sequence_index(to)?;
        if from == HOME_INDEX || to == HOME_INDEX {
            return Err(ChoreoError::invalid_edit("the home sequence cannot be moved"));
        }
        let seq = self.sequences.remove(from);
        self.sequences.insert(to, seq);
        let keys = self.keys.remove(from);
        self.keys.insert(to, keys);
        Ok(())
    }

    pub fn rename_sequence(
        &mut self,
        index: usize,
        name: impl Into<String>,
    ) -> Result<(), ChoreoError> {
        self.check_sequence_index(index)?;
        self.sequences[index].name = name.into();
        Ok(())
    }

    /// Append a copy of a sequence, named "<name> (copy)". Returns its index.
    pub fn duplicate_sequence(&mut self, index: usize) -> Result<usize, ChoreoError> {
        self.check_sequence_index(index)?;
        let mut copy = self.sequences[index].clone();
        copy.name = format!("{} (copy)", copy.name);
        let keys = self.mint_keys(&copy);
        self.keys.push(keys);
        self.sequences.push(copy);
        Ok(self.sequences.len() - 1)
    }

    // ---- snapshot edits ----

    /// Insert a snapshot at `index` within a sequence (`index == len` appends).
    pub fn insert_snapshot(
        &mut self,
        sequence: usize,
        index: usize,
        snapshot: Snapshot,
    ) -> Result<(), ChoreoError> {
        self.check_sequence_index(sequence)?;
        self.check_snapshot(&snapshot)?;
        let len = self.sequences[sequence].snapshots.len();
        if index > len {
            return Err(ChoreoError::invalid_edit(format!(
                "insert index {index} past end ({len})"
            )));
        }
        let key = SnapshotKey(self.mint());
        self.keys[sequence].snapshots.insert(index, key);
        self.sequences[sequence].snapshots.insert(index, snapshot);
        Ok(())
    }

    pub fn push_snapshot(
        &mut self,
        sequence: usize,
        snapshot: Snapshot,
    ) -> Result<usize, ChoreoError> {
        self.check_sequence_index(sequence)?;
        let at = self.sequences[sequence].snapshots.len();
        self.insert_snapshot(sequence, at, snapshot)?;
        Ok(at)
    }

    /// Overwrite a snapshot in place. Its key is kept.
    pub fn replace_snapshot(
        &mut self,
        sequence: usize,
        index: usize,
        snapshot: Snapshot,
    ) -> Result<(), ChoreoError> {
        self.check_snapshot_index(sequence, index)?;
        self.check_snapshot(&snapshot)?;
        self.sequences[sequence].snapshots[index] = snapshot;
        Ok(())
    }

    /// Remove a snapshot. Refused when it is the last one of its sequence.
    pub fn delete_snapshot(
        &mut self,
        sequence: usize,
        index: usize,
    ) -> Result<Snapshot, ChoreoError> {
        self.check_snapshot_index(sequence, index)?;
        let snaps = &mut self.sequences[sequence].snapshots;
        if snaps.len() == 1 {
            return Err(ChoreoError::invalid_edit(
                "a sequence must keep at least one snapshot",
            ));
        }
        self.keys[sequence].snapshots.remove(index);
        Ok(snaps.remove(index))
    }

    pub fn move_snapshot(
        &mut self,
        sequence: usize,
        from: usize,
        to: usize,
    ) -> Result<(), ChoreoError> {
        self.check_snapshot_index(sequence, from)?;
        self.check_snapshot_index(sequence, to)?;
        let snaps = &mut self.sequences[sequence].snapshots;
        let snap = snaps.remove(from);
        snaps.insert(to, snap);
        let keys = &mut self.keys[sequence].snapshots;
        let key = keys.remove(from);
        keys.insert(to, key);
        Ok(())
    }

    pub fn rename_snapshot(
        &mut self,
        sequence: usize,
        index: usize,
        name: impl Into<String>,
    ) -> Result<(), ChoreoError> {
        self.check_snapshot_index(sequence, index)?;
        self.sequences[sequence].snapshots[index].name = name.into();
        Ok(())
    }

    /// Overwrite a stored snapshot's records with the controllers' current state, keeping its name.
    pub fn re_record_snapshot(
        &mut self,
        sequence: usize,
        index: usize,
        controllers: &dyn ControllerSet,
    ) -> Result<(), ChoreoError> {
        self.check_snapshot_index(sequence, index)?;
        let name = self.sequences[sequence].snapshots[index].name.clone();
        let fresh = take_snapshot(controllers, name)?;
        self.replace_snapshot(sequence, index, fresh)
    }

    // ---- keys ----

    fn mint(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    fn mint_keys(&mut self, sequence: &Sequence) -> Keys {
        Keys {
            sequence: SequenceKey(self.mint()),
            snapshots: sequence
                .snapshots
                .iter()
                .map(|_| SnapshotKey(self.mint()))
                .collect(),
        }
    }

    // ---- validation ----

    fn check_sequence_index(&self, index: usize) -> Result<(), ChoreoError> {
        if index >= self.sequences.len() {
            return Err(ChoreoError::SequenceNotFound { index });
        }
        Ok(())
    }

    fn check_snapshot_index(&self, sequence: usize, index: usize) -> Result<(), ChoreoError> {
        self.check_sequence_index(sequence)?;
        if index >= self.sequences[sequence].snapshots.len() {
            return Err(ChoreoError::SnapshotNotFound { sequence, index });
        }
        Ok(())
    }

    fn check_sequence(&self, sequence: &Sequence) -> Result<(), ChoreoError> {
        sequence
            .validate_basic(self.expected_arity)
            .map_err(ChoreoError::invalid_edit)
    }

    fn check_snapshot(&self, snapshot: &Snapshot) -> Result<(), ChoreoError> {
        match self.expected_arity {
            Some(expected) if snapshot.arity() != expected => Err(ChoreoError::invalid_edit(format!(
                "snapshot '{}' has {} records, expected {expected}",
                snapshot.name,
                snapshot.arity()
            ))),
            _ => Ok(()),
        }
    }
}
