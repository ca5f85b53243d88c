use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{EditMemberData, NewMemberData, ReportData, Submitter, SuggestionKind, SuggestionStatus};
use uuid::Uuid;

/// Domain model for an anonymous change proposal against a shared tree.
///
/// Exactly one of the payload fields is populated, matching `kind`. The
/// owner is denormalized from the view code at creation time so moderation
/// queries never have to resolve the code again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub kind: SuggestionKind,
    pub status: SuggestionStatus,
    pub view_code: String,
    pub tree_owner: String,
    pub new_member: Option<NewMemberData>,
    pub edit_member: Option<EditMemberData>,
    pub report: Option<ReportData>,
    pub submitter: Submitter,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Suggestion {
    /// Generate a unique suggestion id.
    pub fn generate_id() -> String {
        format!("suggestion::{}", Uuid::new_v4().simple())
    }
}
