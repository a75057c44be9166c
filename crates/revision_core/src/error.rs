//! crates/revision_core/src/error.rs
//!
//! The error type shared by the revision controller and the history store.

use crate::domain::RevisionId;
use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    /// The request was rejected before any collaborator was called.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The text-generation collaborator failed.
    #[error("Generation failed: {0}")]
    Generation(#[source] PortError),

    /// A persisted history could not be parsed.
    #[error("Invalid persisted history: {0}")]
    Deserialization(String),

    #[error("Revision {0} already exists in history")]
    DuplicateRevision(RevisionId),

    /// Reading or writing the key-value store failed.
    #[error("Persistence error: {0}")]
    Persistence(#[source] PortError),
}

pub type RevisionResult<T> = Result<T, RevisionError>;
