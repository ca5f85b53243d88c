use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender of a family member. Only the two lineage-relevant values are
/// tracked because descent follows the father's line after the first split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

/// A spouse is an embedded record on the member it belongs to, not a member
/// in its own right. Children reference the member plus a `spouse_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spouse {
    pub name: String,
    pub phone_number: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub hometown: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldKind {
    Text,
    Number,
    Date,
    Image,
    Boolean,
}

/// Owner-defined extra attribute on a member (label + typed value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub label: String,
    pub kind: CustomFieldKind,
    pub value: serde_json::Value,
}

/// Wire representation of a family member.
///
/// `name` may pack up to three "-"-separated sub-names (lineage name, legal
/// name, home name); display forms are derived from parts 1 and 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub birthday: Option<NaiveDate>,
    pub marital_status: MaritalStatus,
    pub is_alive: bool,
    pub death_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// Path into the avatar blob store, set by the upload pipeline.
    pub avatar: Option<String>,
    pub spouse: Vec<Spouse>,
    /// Which spouse of the *parent* this member descends from (0-based).
    pub spouse_index: u32,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub view_code: Option<String>,
    pub created_by: String,
    pub custom_fields: Vec<CustomField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal id + name pair for parent pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: String,
    pub name: String,
}

/// One node of the materialized family tree: the member plus its children
/// embedded recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub member: Member,
    pub children: Vec<TreeNode>,
}

/// Aggregate counts over one family tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeStats {
    /// Longest root-to-leaf path, counting the root as generation 1.
    pub total_generations: u32,
    pub total: u32,
    pub male: u32,
    pub female: u32,
    pub alive: u32,
    pub deceased: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub gender: Gender,
    pub birthday: Option<NaiveDate>,
    pub marital_status: MaritalStatus,
    pub is_alive: bool,
    pub death_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub spouse: Option<Vec<Spouse>>,
    #[serde(default)]
    pub spouse_index: u32,
    pub parent: Option<String>,
    /// Existing members to re-parent under the new member.
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub marital_status: Option<MaritalStatus>,
    pub is_alive: Option<bool>,
    pub death_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub spouse: Option<Vec<Spouse>>,
    pub spouse_index: Option<u32>,
    pub custom_fields: Option<Vec<CustomField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewCodeResponse {
    pub view_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Add,
    Edit,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionStatus::Pending => write!(f, "pending"),
            SuggestionStatus::Approved => write!(f, "approved"),
            SuggestionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Payload for an "add" suggestion: the proposed new member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMemberData {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub parent_id: Option<String>,
    /// Parent name captured at submission time for display.
    pub parent_name: Option<String>,
    pub spouse_index: Option<u32>,
    pub is_alive: Option<bool>,
    pub death_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Payload for an "edit" suggestion: one field of one member. Values travel
/// as strings and are coerced to the field's type on approval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditMemberData {
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub note: Option<String>,
}

/// Payload for a "report" suggestion: free-text problem description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub description: Option<String>,
}

/// Who submitted a suggestion. Unauthenticated; only the name is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submitter {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub relationship: Option<String>,
}

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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSuggestionRequest {
    pub kind: SuggestionKind,
    pub view_code: String,
    pub new_member: Option<NewMemberData>,
    pub edit_member: Option<EditMemberData>,
    pub report: Option<ReportData>,
    pub submitter: Submitter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCountResponse {
    pub count: u32,
}

/// Snapshot of the currently visible tree, framed for download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTreeResponse {
    pub svg_content: String,
    pub filename: String,
    pub member_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathRequest {
    pub custom_path: Option<String>,
    pub search: Option<String>,
    pub hide_female: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub member_count: usize,
}
