//! # REST API for Suggestion Moderation
//!
//! The public submission endpoint plus the owner-only moderation surface
//! (list, count, approve, reject, revert, delete).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::suggestions::{ModerateSuggestionCommand, SuggestionListQuery};
use crate::domain::errors::TreeError;
use crate::io::rest::identity::OwnerId;
use crate::io::rest::mappers;
use crate::AppState;
use shared::{CreateSuggestionRequest, SuggestionCountResponse, SuggestionStatus};

/// Public: submit a suggestion against a shared tree
pub async fn create_suggestion(
    State(state): State<AppState>,
    Json(request): Json<CreateSuggestionRequest>,
) -> impl IntoResponse {
    info!("POST /api/suggestions - tree: {}", request.view_code);

    match state
        .suggestion_service
        .create_suggestion(mappers::create_suggestion_command(request))
    {
        Ok(result) => (
            StatusCode::CREATED,
            Json(mappers::suggestion_to_dto(result.suggestion)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create suggestion: {}", e);
            e.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionListParams {
    pub status: Option<String>,
}

/// "all" (or nothing) means no status filter.
fn parse_status_filter(raw: Option<String>) -> Result<Option<SuggestionStatus>, TreeError> {
    match raw.as_deref() {
        None | Some("all") => Ok(None),
        Some("pending") => Ok(Some(SuggestionStatus::Pending)),
        Some("approved") => Ok(Some(SuggestionStatus::Approved)),
        Some("rejected") => Ok(Some(SuggestionStatus::Rejected)),
        Some(other) => Err(TreeError::validation(format!(
            "Invalid status filter: {}",
            other
        ))),
    }
}

/// List the caller's suggestions, newest first
pub async fn list_suggestions(
    State(state): State<AppState>,
    owner: OwnerId,
    Query(params): Query<SuggestionListParams>,
) -> impl IntoResponse {
    info!("GET /api/suggestions - status: {:?}", params.status);

    let status = match parse_status_filter(params.status) {
        Ok(status) => status,
        Err(e) => return e.into_response(),
    };

    match state.suggestion_service.list_suggestions(SuggestionListQuery {
        owner_id: owner.0,
        status,
    }) {
        Ok(result) => {
            let suggestions: Vec<shared::Suggestion> = result
                .suggestions
                .into_iter()
                .map(mappers::suggestion_to_dto)
                .collect();
            Json(suggestions).into_response()
        }
        Err(e) => {
            error!("Failed to list suggestions: {}", e);
            e.into_response()
        }
    }
}

/// Badge count of pending suggestions
pub async fn count_pending(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    match state.suggestion_service.count_pending(&owner.0) {
        Ok(count) => Json(SuggestionCountResponse { count }).into_response(),
        Err(e) => {
            error!("Failed to count suggestions: {}", e);
            e.into_response()
        }
    }
}

/// Approve a pending suggestion, applying its change
pub async fn approve_suggestion(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(suggestion_id): Path<String>,
) -> impl IntoResponse {
    info!("PUT /api/suggestions/{}/approve", suggestion_id);

    match state.suggestion_service.approve(ModerateSuggestionCommand {
        owner_id: owner.0,
        suggestion_id,
    }) {
        Ok(result) => Json(mappers::suggestion_to_dto(result.suggestion)).into_response(),
        Err(e) => {
            error!("Failed to approve suggestion: {}", e);
            e.into_response()
        }
    }
}

/// Reject a pending suggestion
pub async fn reject_suggestion(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(suggestion_id): Path<String>,
) -> impl IntoResponse {
    info!("PUT /api/suggestions/{}/reject", suggestion_id);

    match state.suggestion_service.reject(ModerateSuggestionCommand {
        owner_id: owner.0,
        suggestion_id,
    }) {
        Ok(result) => Json(mappers::suggestion_to_dto(result.suggestion)).into_response(),
        Err(e) => {
            error!("Failed to reject suggestion: {}", e);
            e.into_response()
        }
    }
}

/// Put a processed suggestion back into the queue
pub async fn revert_suggestion(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(suggestion_id): Path<String>,
) -> impl IntoResponse {
    info!("PUT /api/suggestions/{}/revert", suggestion_id);

    match state.suggestion_service.revert(ModerateSuggestionCommand {
        owner_id: owner.0,
        suggestion_id,
    }) {
        Ok(result) => Json(mappers::suggestion_to_dto(result.suggestion)).into_response(),
        Err(e) => {
            error!("Failed to revert suggestion: {}", e);
            e.into_response()
        }
    }
}

/// Remove a suggestion entirely
pub async fn delete_suggestion(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(suggestion_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/suggestions/{}", suggestion_id);

    match state.suggestion_service.delete(ModerateSuggestionCommand {
        owner_id: owner.0,
        suggestion_id,
    }) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete suggestion: {}", e);
            e.into_response()
        }
    }
}
