//! crates/revision_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a `Revision`.
///
/// Backed by a UUIDv7, so ids sort by creation time and stay unique even when
/// several revisions are created within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId(Uuid);

impl RevisionId {
    /// Generates a fresh, time-ordered id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RevisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How a run of text relates the original text to the suggested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Unchanged,
    Added,
    Removed,
}

/// A single labeled run of text produced by a word-level comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSegment {
    pub value: String,
    pub kind: SegmentKind,
}

impl DiffSegment {
    pub fn new(kind: SegmentKind, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    /// True if this segment is part of the suggested (forward) side.
    pub fn in_suggestion(&self) -> bool {
        self.kind != SegmentKind::Removed
    }

    /// True if this segment is part of the original (backward) side.
    pub fn in_original(&self) -> bool {
        self.kind != SegmentKind::Added
    }
}

/// An immutable record of one rewrite attempt.
///
/// Fields are read-only after construction; a `Revision` is only ever built by
/// the controller or revived from persisted history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    id: RevisionId,
    original: String,
    suggestion: String,
    instruction: String,
    created_at: DateTime<Utc>,
    diff: Vec<DiffSegment>,
}

impl Revision {
    pub(crate) fn from_parts(
        id: RevisionId,
        original: String,
        suggestion: String,
        instruction: String,
        created_at: DateTime<Utc>,
        diff: Vec<DiffSegment>,
    ) -> Self {
        Self {
            id,
            original,
            suggestion,
            instruction,
            created_at,
            diff,
        }
    }

    pub fn id(&self) -> RevisionId {
        self.id
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn suggestion(&self) -> &str {
        &self.suggestion
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The cached diff between `original` and `suggestion`.
    pub fn diff(&self) -> &[DiffSegment] {
        &self.diff
    }
}

/// The outcome of restoring a revision: a new working text plus the
/// instruction that produced the revision.
///
/// Callers apply both values and clear any suggestion currently on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub working_text: String,
    pub instruction: String,
}
