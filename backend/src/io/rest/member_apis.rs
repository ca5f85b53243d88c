//! # REST API for Member Management
//!
//! Endpoints for creating, retrieving, updating and deleting family members,
//! plus the materialized tree, its statistics and the snapshot export.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::members::DeleteMemberCommand;
use crate::domain::tree_view::TreeView;
use crate::io::rest::identity::OwnerId;
use crate::io::rest::mappers;
use crate::AppState;
use shared::{CreateMemberRequest, ExportToPathRequest, UpdateMemberRequest};

/// Create a new member
pub async fn create_member(
    State(state): State<AppState>,
    owner: OwnerId,
    Json(request): Json<CreateMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members - name: {}", request.name);

    match state
        .member_service
        .create_member(mappers::create_member_command(owner.0, request))
    {
        Ok(result) => (StatusCode::CREATED, Json(mappers::member_to_dto(result.member))).into_response(),
        Err(e) => {
            error!("Failed to create member: {}", e);
            e.into_response()
        }
    }
}

/// List all of the caller's members, flat
pub async fn list_members(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    info!("GET /api/members");

    match state.member_service.list_members(&owner.0) {
        Ok(result) => {
            let members: Vec<shared::Member> =
                result.members.into_iter().map(mappers::member_to_dto).collect();
            Json(members).into_response()
        }
        Err(e) => {
            error!("Failed to list members: {}", e);
            e.into_response()
        }
    }
}

/// Id + name pairs for pickers
pub async fn list_members_flat(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    info!("GET /api/members/flat");

    match state.member_service.list_flat(&owner.0) {
        Ok(result) => Json(result.members).into_response(),
        Err(e) => {
            error!("Failed to list members: {}", e);
            e.into_response()
        }
    }
}

/// The caller's materialized family tree
pub async fn get_family_tree(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    info!("GET /api/members/family-tree");

    match state.member_service.family_tree(&owner.0) {
        Ok(result) => Json(mappers::forest_to_dto(result.forest)).into_response(),
        Err(e) => {
            error!("Failed to materialize family tree: {}", e);
            e.into_response()
        }
    }
}

/// Aggregate statistics over the caller's tree
pub async fn get_tree_stats(State(state): State<AppState>, owner: OwnerId) -> impl IntoResponse {
    info!("GET /api/members/stats");

    match state.member_service.tree_stats(&owner.0) {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Failed to compute tree stats: {}", e);
            e.into_response()
        }
    }
}

/// Update a member
pub async fn update_member(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(member_id): Path<String>,
    Json(request): Json<UpdateMemberRequest>,
) -> impl IntoResponse {
    info!("PUT /api/members/{}", member_id);

    match state
        .member_service
        .update_member(mappers::update_member_command(owner.0, member_id, request))
    {
        Ok(result) => Json(mappers::member_to_dto(result.member)).into_response(),
        Err(e) => {
            error!("Failed to update member: {}", e);
            e.into_response()
        }
    }
}

/// Delete a member; refused while the member still has children
pub async fn delete_member(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(member_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/members/{}", member_id);

    match state.member_service.delete_member(DeleteMemberCommand {
        owner_id: owner.0,
        member_id,
    }) {
        Ok(result) => Json(serde_json::json!({ "message": result.success_message })).into_response(),
        Err(e) => {
            error!("Failed to delete member: {}", e);
            e.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub search: Option<String>,
    pub hide_female: Option<bool>,
}

fn view_from_filters(search: Option<String>, hide_female: Option<bool>) -> TreeView {
    let mut view = TreeView::new();
    if let Some(term) = search {
        view.set_search_term(&term);
    }
    view.set_hide_female(hide_female.unwrap_or(false));
    view
}

/// Snapshot of the visible tree as a downloadable document
pub async fn export_tree(
    State(state): State<AppState>,
    owner: OwnerId,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    info!("GET /api/members/export");

    let forest = match state.member_service.family_tree(&owner.0) {
        Ok(result) => result.forest,
        Err(e) => {
            error!("Failed to materialize tree for export: {}", e);
            return e.into_response();
        }
    };

    let view = view_from_filters(query.search, query.hide_female);
    match state.export_service.render_snapshot(&view, &forest) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            error!("Failed to render tree snapshot: {}", e);
            e.into_response()
        }
    }
}

/// Snapshot written straight to a directory on the server host
pub async fn export_tree_to_path(
    State(state): State<AppState>,
    owner: OwnerId,
    Json(request): Json<ExportToPathRequest>,
) -> impl IntoResponse {
    info!("POST /api/members/export-file");

    let forest = match state.member_service.family_tree(&owner.0) {
        Ok(result) => result.forest,
        Err(e) => {
            error!("Failed to materialize tree for export: {}", e);
            return e.into_response();
        }
    };

    let view = view_from_filters(request.search, request.hide_female);
    match state
        .export_service
        .export_to_path(&view, &forest, request.custom_path)
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Failed to export tree to path: {}", e);
            e.into_response()
        }
    }
}
