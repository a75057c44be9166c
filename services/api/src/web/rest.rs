//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ApiError, ErrorResponse};
use crate::web::{
    protocol::{
        CreateRevisionRequest, EditorView, RevisionView, SegmentKindView, SegmentView,
        UpdateInstructionRequest, UpdateTextRequest,
    },
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use revision_core::controller;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_editor_handler,
        update_text_handler,
        update_instruction_handler,
        create_revision_handler,
        list_revisions_handler,
        get_revision_handler,
        accept_revision_handler,
        reject_revision_handler,
        restore_revision_handler,
        clear_revisions_handler,
    ),
    components(
        schemas(
            CreateRevisionRequest,
            UpdateTextRequest,
            UpdateInstructionRequest,
            EditorView,
            RevisionView,
            SegmentView,
            SegmentKindView,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Revision Assistant API", description = "Rewrite text with an LLM and navigate the resulting revisions.")
    )
)]
pub struct ApiDoc;

pub type ApiResult<T> = Result<T, ApiError>;

//=========================================================================================
// Editor Handlers
//=========================================================================================

/// Returns the working text, instruction, displayed suggestion and history.
#[utoipa::path(
    get,
    path = "/editor",
    responses((status = 200, description = "Current editor state", body = EditorView))
)]
pub async fn get_editor_handler(State(app_state): State<Arc<AppState>>) -> Json<EditorView> {
    let editor = app_state.editor.lock().await;
    Json(EditorView::new(&editor, app_state.pending()))
}

/// Replaces the working text with user input.
#[utoipa::path(
    put,
    path = "/editor/text",
    request_body = UpdateTextRequest,
    responses((status = 200, description = "Working text updated", body = EditorView))
)]
pub async fn update_text_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<UpdateTextRequest>,
) -> Json<EditorView> {
    let mut editor = app_state.editor.lock().await;
    editor.set_working_text(request.text);
    Json(EditorView::new(&editor, app_state.pending()))
}

/// Replaces the rewrite instruction with user input.
#[utoipa::path(
    put,
    path = "/editor/instruction",
    request_body = UpdateInstructionRequest,
    responses((status = 200, description = "Instruction updated", body = EditorView))
)]
pub async fn update_instruction_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<UpdateInstructionRequest>,
) -> Json<EditorView> {
    let mut editor = app_state.editor.lock().await;
    editor.set_instruction(request.instruction);
    Json(EditorView::new(&editor, app_state.pending()))
}

//=========================================================================================
// Revision Handlers
//=========================================================================================

/// Requests a rewrite and records it as the newest revision.
///
/// Concurrent requests are not serialized: each one is added to the history
/// when its rewrite completes. The history is only replaced once the new
/// version has been persisted.
#[utoipa::path(
    post,
    path = "/revisions",
    request_body = CreateRevisionRequest,
    responses(
        (status = 201, description = "Revision created", body = RevisionView),
        (status = 400, description = "Empty text or instruction", body = ErrorResponse),
        (status = 502, description = "The generation service failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_revision_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CreateRevisionRequest>,
) -> ApiResult<(StatusCode, Json<RevisionView>)> {
    let (text, instruction, since) = {
        let editor = app_state.editor.lock().await;
        let text = request
            .text
            .clone()
            .unwrap_or_else(|| editor.working_text().to_string());
        let instruction = request
            .instruction
            .clone()
            .unwrap_or_else(|| editor.instruction().to_string());
        (text, instruction, editor.versions())
    };

    let revision = {
        let _pending = app_state.begin_request();
        controller::create_revision(&text, &instruction, app_state.rewriter.as_ref()).await?
    };

    let mut editor = app_state.editor.lock().await;
    let mut history = editor.history.clone();
    history.append(revision.clone())?;
    app_state.persist(&history)?;
    editor.history = history;

    // Cells the user edited while the rewrite was in flight keep their newer values.
    editor.record_submitted(since, request.text, request.instruction);
    editor.suggestion = Some(revision.suggestion().to_string());

    info!(
        "Revision {} added; history holds {} revision(s).",
        revision.id(),
        editor.history.len()
    );
    Ok((StatusCode::CREATED, Json(RevisionView::from(&revision))))
}

/// Lists every stored revision, newest first.
#[utoipa::path(
    get,
    path = "/revisions",
    responses((status = 200, description = "All revisions, newest first", body = [RevisionView]))
)]
pub async fn list_revisions_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<RevisionView>> {
    let editor = app_state.editor.lock().await;
    Json(editor.history.iter().map(RevisionView::from).collect())
}

#[utoipa::path(
    get,
    path = "/revisions/{id}",
    params(("id" = Uuid, Path, description = "The revision id.")),
    responses(
        (status = 200, description = "The revision", body = RevisionView),
        (status = 404, description = "No such revision", body = ErrorResponse)
    )
)]
pub async fn get_revision_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RevisionView>> {
    let editor = app_state.editor.lock().await;
    Ok(Json(RevisionView::from(editor.revision(id)?)))
}

/// Replaces the working text with the revision's suggested side.
#[utoipa::path(
    post,
    path = "/revisions/{id}/accept",
    params(("id" = Uuid, Path, description = "The revision id.")),
    responses(
        (status = 200, description = "Suggestion accepted", body = EditorView),
        (status = 404, description = "No such revision", body = ErrorResponse)
    )
)]
pub async fn accept_revision_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EditorView>> {
    let mut editor = app_state.editor.lock().await;
    let text = controller::accept(editor.revision(id)?);
    editor.set_working_text(text);
    editor.suggestion = None;
    Ok(Json(EditorView::new(&editor, app_state.pending())))
}

/// Replaces the working text with the revision's original text.
#[utoipa::path(
    post,
    path = "/revisions/{id}/reject",
    params(("id" = Uuid, Path, description = "The revision id.")),
    responses(
        (status = 200, description = "Suggestion rejected", body = EditorView),
        (status = 404, description = "No such revision", body = ErrorResponse)
    )
)]
pub async fn reject_revision_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EditorView>> {
    let mut editor = app_state.editor.lock().await;
    let text = controller::reject(editor.revision(id)?);
    editor.set_working_text(text);
    editor.suggestion = None;
    Ok(Json(EditorView::new(&editor, app_state.pending())))
}

/// Brings back the revision's original text and instruction for another attempt.
#[utoipa::path(
    post,
    path = "/revisions/{id}/restore",
    params(("id" = Uuid, Path, description = "The revision id.")),
    responses(
        (status = 200, description = "Revision restored", body = EditorView),
        (status = 404, description = "No such revision", body = ErrorResponse)
    )
)]
pub async fn restore_revision_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EditorView>> {
    let mut editor = app_state.editor.lock().await;
    let restored = controller::restore(editor.revision(id)?);
    editor.set_working_text(restored.working_text);
    editor.set_instruction(restored.instruction);
    editor.suggestion = None;
    Ok(Json(EditorView::new(&editor, app_state.pending())))
}

/// Deletes the whole history.
#[utoipa::path(
    delete,
    path = "/revisions",
    responses(
        (status = 204, description = "History cleared"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn clear_revisions_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let mut editor = app_state.editor.lock().await;
    let cleared = editor.history.len();
    editor.history.clear();
    editor.suggestion = None;
    if let Err(e) = app_state.persist(&editor.history) {
        error!("Failed to persist cleared history: {}", e);
        return Err(e.into());
    }
    info!("Cleared {} revision(s).", cleared);
    Ok(StatusCode::NO_CONTENT)
}
