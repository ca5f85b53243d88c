//! # REST API for Tree Sharing
//!
//! View-code management for the owner plus the public, unauthenticated
//! read-only tree view behind a code.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};
use log::{error, info};

use crate::io::rest::identity::OwnerId;
use crate::io::rest::mappers;
use crate::AppState;
use shared::ViewCodeResponse;

/// The caller's current view code, if one was ever generated
pub async fn get_view_code(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    info!("GET /api/members/view-code");

    match state.share_service.current_view_code(&owner.0) {
        Ok(view_code) => Json(ViewCodeResponse { view_code }).into_response(),
        Err(e) => {
            error!("Failed to look up view code: {}", e);
            e.into_response()
        }
    }
}

/// Mint a fresh view code across the whole tree
pub async fn generate_view_code(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    info!("POST /api/members/generate-view-code");

    match state.share_service.generate_view_code(&owner.0) {
        Ok(result) => Json(ViewCodeResponse {
            view_code: Some(result.view_code),
        })
        .into_response(),
        Err(e) => {
            error!("Failed to generate view code: {}", e);
            e.into_response()
        }
    }
}

/// Backfill the existing code onto members that lack it
pub async fn update_view_code(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    info!("POST /api/members/update-view-code");

    match state.share_service.sync_view_code(&owner.0) {
        Ok(result) => Json(ViewCodeResponse {
            view_code: Some(result.view_code),
        })
        .into_response(),
        Err(e) => {
            error!("Failed to sync view code: {}", e);
            e.into_response()
        }
    }
}

/// Public read-only tree view behind a code. No authentication.
pub async fn view_by_code(
    State(state): State<AppState>,
    Path(view_code): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/view/{}", view_code);

    match state.share_service.tree_by_view_code(&view_code) {
        Ok(result) => Json(mappers::forest_to_dto(result.forest)).into_response(),
        Err(e) => {
            error!("Failed to load shared tree: {}", e);
            e.into_response()
        }
    }
}
