//! Error taxonomy shared by every Atlas crate.
//!
//! Nothing here is fatal: callers surface the message to the user and keep
//! the last-known-good state. There is no automatic retry.

use thiserror::Error;

pub type Result<T, E = MapError> = std::result::Result<T, E>;

/// Failure reported by the host's read/write collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct IoFailure(pub String);

impl IoFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// The document could not be read or parsed. Any previously cached copy
    /// stays in place.
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    /// Writing the document failed. The cache still holds the previous copy.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: IoFailure,
    },

    /// Region geometry that cannot be committed (e.g. fewer than three points).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Drawing API called in the wrong state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A pin, region, or layer id that the document does not contain.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// An insert whose id is already taken.
    #[error("{kind} {id} already exists")]
    Duplicate { kind: &'static str, id: String },

    /// Document-level invariant broken (zero extent, unencodable content).
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Operation the engine does not implement for this kind.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A result arrived for a view that no longer shows `path`.
    #[error("view no longer shows {path}")]
    Closed { path: String },
}

impl MapError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether the error came from the host's I/O rather than from the engine.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Write { .. })
    }
}
