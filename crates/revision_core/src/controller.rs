//! crates/revision_core/src/controller.rs
//!
//! The revision controller: creates revisions through the rewrite port and
//! resolves accept/reject/restore into new working-text values.
//!
//! Nothing here touches the history. Callers prepend the created revision
//! themselves, in whatever order their requests complete.

use crate::diff::{compute_diff, forward_text};
use crate::domain::{Restored, Revision, RevisionId};
use crate::error::{RevisionError, RevisionResult};
use crate::ports::RewriteService;
use chrono::Utc;
use tracing::{info, warn};

/// Requests a rewrite of `original` and records the result as a new `Revision`.
///
/// Rejects blank text or a blank instruction without calling `rewriter`.
/// Otherwise the rewriter is called exactly once; if it fails, no revision is
/// produced and the error is returned as `RevisionError::Generation`.
pub async fn create_revision(
    original: &str,
    instruction: &str,
    rewriter: &dyn RewriteService,
) -> RevisionResult<Revision> {
    if original.trim().is_empty() {
        return Err(RevisionError::Validation(
            "the text to rewrite is empty".to_string(),
        ));
    }
    if instruction.trim().is_empty() {
        return Err(RevisionError::Validation(
            "the rewrite instruction is empty".to_string(),
        ));
    }

    let suggestion = rewriter
        .rewrite(original, instruction)
        .await
        .map_err(|e| {
            warn!("Rewrite request failed: {}", e);
            RevisionError::Generation(e)
        })?;

    let diff = compute_diff(original, &suggestion);
    let revision = Revision::from_parts(
        RevisionId::new(),
        original.to_string(),
        suggestion,
        instruction.to_string(),
        Utc::now(),
        diff,
    );
    info!(
        "Created revision {} ({} diff segment(s)).",
        revision.id(),
        revision.diff().len()
    );
    Ok(revision)
}

/// The working text after accepting the revision: the forward side of its diff.
pub fn accept(revision: &Revision) -> String {
    forward_text(revision.diff())
}

/// The working text after rejecting the revision: its original text.
pub fn reject(revision: &Revision) -> String {
    revision.original().to_string()
}

/// Brings back the text and instruction that produced the revision so the
/// rewrite can be attempted again differently.
pub fn restore(revision: &Revision) -> Restored {
    Restored {
        working_text: revision.original().to_string(),
        instruction: revision.instruction().to_string(),
    }
}
