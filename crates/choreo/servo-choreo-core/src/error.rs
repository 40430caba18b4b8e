//! Error types for the choreography core

use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// Error type for store edits, playback requests and persistence.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ChoreoError {
    /// No controllers were available for a snapshot or playback request
    #[error("No controllers available")]
    ControllerUnavailable,

    /// A store mutation would break a data-model invariant
    #[error("Invalid edit: {reason}")]
    InvalidEdit { reason: String },

    /// Snapshot record count disagrees with the live controller count
    #[error("Snapshot arity mismatch: {expected} controllers, {actual} records")]
    SnapshotArityMismatch { expected: usize, actual: usize },

    /// Sequence index out of range
    #[error("Sequence not found: {index}")]
    SequenceNotFound { index: usize },

    /// Snapshot index out of range within a sequence
    #[error("Snapshot not found: {index} in sequence {sequence}")]
    SnapshotNotFound { sequence: usize, index: usize },

    /// A roster entry does not declare a required capability
    #[error("Controller {index} lacks capability {capability:?}")]
    MissingCapability {
        index: usize,
        capability: Capability,
    },

    /// Save written by an unknown schema version
    #[error("Unsupported schema version {found} (supported: {supported})")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    /// Save parsed but violates the data model
    #[error("Corrupt save: {reason}")]
    CorruptSave { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl ChoreoError {
    pub fn invalid_edit(reason: impl Into<String>) -> Self {
        Self::InvalidEdit {
            reason: reason.into(),
        }
    }

    /// Check if playback can carry on after this error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ControllerUnavailable
                | Self::InvalidEdit { .. }
                | Self::SnapshotArityMismatch { .. }
                | Self::SequenceNotFound { .. }
                | Self::SnapshotNotFound { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::ControllerUnavailable | Self::MissingCapability { .. } => "controller",
            Self::InvalidEdit { .. }
            | Self::SequenceNotFound { .. }
            | Self::SnapshotNotFound { .. } => "store",
            Self::SnapshotArityMismatch { .. } => "playback",
            Self::UnsupportedSchemaVersion { .. }
            | Self::CorruptSave { .. }
            | Self::Serialization { .. } => "persistence",
        }
    }
}

impl From<serde_json::Error> for ChoreoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        assert!(ChoreoError::ControllerUnavailable.is_recoverable());
        assert!(ChoreoError::invalid_edit("empty").is_recoverable());
        let fatal = ChoreoError::CorruptSave {
            reason: "bad index".into(),
        };
        assert!(!fatal.is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ChoreoError::invalid_edit("x").category(), "store");
        let mismatch = ChoreoError::SnapshotArityMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(mismatch.category(), "playback");
        assert_eq!(
            mismatch.to_string(),
            "Snapshot arity mismatch: 3 controllers, 2 records"
        );
    }

    #[test]
    fn test_serialization() {
        let error = ChoreoError::SnapshotNotFound {
            sequence: 1,
            index: 4,
        };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: ChoreoError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(
            ChoreoError::from(err),
            ChoreoError::Serialization { .. }
        ));
    }
}
