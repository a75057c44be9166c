//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the editor's value cells.

use crate::config::Config;
use crate::error::ApiError;
use revision_core::{
    ports::{KeyValueStore, RewriteService},
    History, Revision, RevisionId, RevisionResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub rewriter: Arc<dyn RewriteService>,
    pub store: Arc<dyn KeyValueStore>,
    /// Single writer for the editor cells and the history. Never held while a
    /// rewrite request is in flight.
    pub editor: Mutex<EditorState>,
    /// Rewrite requests awaiting the generation service.
    pending: AtomicUsize,
}

impl AppState {
    /// Builds the state, restoring any history persisted under the configured key.
    pub fn new(
        config: Arc<Config>,
        rewriter: Arc<dyn RewriteService>,
        store: Arc<dyn KeyValueStore>,
    ) -> RevisionResult<Self> {
        let history = History::restore_from(store.as_ref(), &config.history_key)?;
        Ok(Self {
            config,
            rewriter,
            store,
            editor: Mutex::new(EditorState::with_history(history)),
            pending: AtomicUsize::new(0),
        })
    }

    /// Number of rewrite requests still waiting on the generation service.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Counts a rewrite request as pending until the returned guard is dropped,
    /// including when the request future itself is dropped mid-flight.
    pub fn begin_request(&self) -> PendingRequest<'_> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        PendingRequest {
            counter: &self.pending,
        }
    }

    /// Writes the current history to the store.
    pub fn persist(&self, history: &History) -> RevisionResult<()> {
        history.persist(self.store.as_ref(), &self.config.history_key)
    }
}

pub struct PendingRequest<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

//=========================================================================================
// EditorState (The Text Being Edited)
//=========================================================================================

/// The editor's independently owned value cells plus the revision history.
///
/// Every write to `working_text` or `instruction` bumps its edit counter, so a
/// rewrite that completes late can tell whether the user changed a cell since
/// the request started.
#[derive(Debug, Default)]
pub struct EditorState {
    working_text: String,
    instruction: String,
    text_edits: u64,
    instruction_edits: u64,
    /// The suggestion on display, if any.
    pub suggestion: Option<String>,
    pub history: History,
}

/// The edit counters of both cells at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellVersions {
    text: u64,
    instruction: u64,
}

impl EditorState {
    pub fn with_history(history: History) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn working_text(&self) -> &str {
        &self.working_text
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn set_working_text(&mut self, text: String) {
        self.working_text = text;
        self.text_edits += 1;
    }

    pub fn set_instruction(&mut self, instruction: String) {
        self.instruction = instruction;
        self.instruction_edits += 1;
    }

    pub fn versions(&self) -> CellVersions {
        CellVersions {
            text: self.text_edits,
            instruction: self.instruction_edits,
        }
    }

    /// Writes the inputs of a completed rewrite into the cells, skipping any
    /// cell that was edited after `since` was taken.
    pub fn record_submitted(
        &mut self,
        since: CellVersions,
        text: Option<String>,
        instruction: Option<String>,
    ) {
        if let Some(text) = text {
            if self.text_edits == since.text {
                self.set_working_text(text);
            }
        }
        if let Some(instruction) = instruction {
            if self.instruction_edits == since.instruction {
                self.set_instruction(instruction);
            }
        }
    }

    /// Looks up a stored revision by its id.
    pub fn revision(&self, id: Uuid) -> Result<&Revision, ApiError> {
        self.history
            .get(RevisionId::from_uuid(id))
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }
}
