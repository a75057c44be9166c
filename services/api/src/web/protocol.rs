//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the editor client and the API server.

use crate::web::state::EditorState;
use chrono::{DateTime, Utc};
use revision_core::{DiffSegment, Revision, SegmentKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

/// Asks for a new revision. Fields left out fall back to the editor's current
/// working text and instruction.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateRevisionRequest {
    pub text: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateTextRequest {
    pub text: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateInstructionRequest {
    pub instruction: String,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKindView {
    Unchanged,
    Added,
    Removed,
}

/// One styled run of a revision's diff.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct SegmentView {
    pub value: String,
    pub kind: SegmentKindView,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct RevisionView {
    pub id: Uuid,
    pub original: String,
    pub suggestion: String,
    pub instruction: String,
    pub created_at: DateTime<Utc>,
    pub diff: Vec<SegmentView>,
}

/// Everything the editor screen renders.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct EditorView {
    pub working_text: String,
    pub instruction: String,
    /// The most recent suggestion, until it is accepted, rejected or restored.
    pub suggestion: Option<String>,
    /// Rewrite requests still waiting on the generation service.
    pub pending: usize,
    /// Newest first.
    pub revisions: Vec<RevisionView>,
}

impl From<SegmentKind> for SegmentKindView {
    fn from(kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Unchanged => SegmentKindView::Unchanged,
            SegmentKind::Added => SegmentKindView::Added,
            SegmentKind::Removed => SegmentKindView::Removed,
        }
    }
}

impl From<&DiffSegment> for SegmentView {
    fn from(segment: &DiffSegment) -> Self {
        Self {
            value: segment.value.clone(),
            kind: segment.kind.into(),
        }
    }
}

impl From<&Revision> for RevisionView {
    fn from(revision: &Revision) -> Self {
        Self {
            id: revision.id().as_uuid(),
            original: revision.original().to_string(),
            suggestion: revision.suggestion().to_string(),
            instruction: revision.instruction().to_string(),
            created_at: revision.created_at(),
            diff: revision.diff().iter().map(SegmentView::from).collect(),
        }
    }
}

impl EditorView {
    pub fn new(editor: &EditorState, pending: usize) -> Self {
        Self {
            working_text: editor.working_text().to_string(),
            instruction: editor.instruction().to_string(),
            suggestion: editor.suggestion.clone(),
            pending,
            revisions: editor.history.iter().map(RevisionView::from).collect(),
        }
    }
}
