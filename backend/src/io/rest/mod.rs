//! # REST API Interface Layer
//!
//! HTTP endpoints for the family tree service. This layer is a pure
//! translation boundary: it deserializes requests, hands explicit commands
//! to the domain services, and maps the domain error taxonomy onto status
//! codes. No business logic lives here.

pub mod identity;
pub mod mappers;
pub mod member_apis;
pub mod share_apis;
pub mod suggestion_apis;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use log::error;

use crate::domain::errors::TreeError;
use crate::AppState;

/// Build the `/api` router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/members",
            get(member_apis::list_members).post(member_apis::create_member),
        )
        .route("/members/flat", get(member_apis::list_members_flat))
        .route("/members/stats", get(member_apis::get_tree_stats))
        .route("/members/family-tree", get(member_apis::get_family_tree))
        .route("/members/view-code", get(share_apis::get_view_code))
        .route("/members/generate-view-code", post(share_apis::generate_view_code))
        .route("/members/update-view-code", post(share_apis::update_view_code))
        .route("/members/export", get(member_apis::export_tree))
        .route("/members/export-file", post(member_apis::export_tree_to_path))
        .route(
            "/members/:id",
            put(member_apis::update_member).delete(member_apis::delete_member),
        )
        .route("/view/:view_code", get(share_apis::view_by_code))
        .route(
            "/suggestions",
            post(suggestion_apis::create_suggestion).get(suggestion_apis::list_suggestions),
        )
        .route("/suggestions/count", get(suggestion_apis::count_pending))
        .route("/suggestions/:id/approve", put(suggestion_apis::approve_suggestion))
        .route("/suggestions/:id/reject", put(suggestion_apis::reject_suggestion))
        .route("/suggestions/:id/revert", put(suggestion_apis::revert_suggestion))
        .route("/suggestions/:id", delete(suggestion_apis::delete_suggestion))
}

impl IntoResponse for TreeError {
    fn into_response(self) -> Response {
        let status = match &self {
            TreeError::Validation(_) => StatusCode::BAD_REQUEST,
            TreeError::NotFound(_) => StatusCode::NOT_FOUND,
            TreeError::MemberHasChildren
            | TreeError::SuggestionNotPending
            | TreeError::SuggestionAlreadyPending
            | TreeError::EmptyTree
            | TreeError::MissingViewCode => StatusCode::CONFLICT,
            TreeError::Store(e) => {
                // Storage details stay out of responses.
                error!("Storage error: {:#}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal storage error")
                    .into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}
