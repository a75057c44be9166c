pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub use rest::ApiDoc;
pub use state::{AppState, EditorState};

/// Builds the API router over the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/editor", get(rest::get_editor_handler))
        .route("/editor/text", put(rest::update_text_handler))
        .route("/editor/instruction", put(rest::update_instruction_handler))
        .route(
            "/revisions",
            get(rest::list_revisions_handler)
                .post(rest::create_revision_handler)
                .delete(rest::clear_revisions_handler),
        )
        .route("/revisions/{id}", get(rest::get_revision_handler))
        .route("/revisions/{id}/accept", post(rest::accept_revision_handler))
        .route("/revisions/{id}/reject", post(rest::reject_revision_handler))
        .route("/revisions/{id}/restore", post(rest::restore_revision_handler))
        .with_state(app_state)
}
