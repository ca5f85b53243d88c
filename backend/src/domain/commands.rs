//! Domain-level command and query types.
//!
//! These structs are consumed by services inside the domain layer and are
//! **not** exposed over the public API; the REST layer maps the DTOs in the
//! `shared` crate to these internal types. Every command carries an explicit
//! owner id rather than reading identity from ambient request state.

pub mod members {
    use crate::domain::models::member::Member;
    use crate::domain::tree::TreeNode;
    use chrono::NaiveDate;
    use shared::{CustomField, Gender, MaritalStatus, MemberRef, Spouse};

    /// Input for creating a new member.
    #[derive(Debug, Clone)]
    pub struct CreateMemberCommand {
        pub owner_id: String,
        pub name: String,
        pub gender: Gender,
        pub birthday: Option<NaiveDate>,
        pub marital_status: MaritalStatus,
        pub is_alive: bool,
        pub death_date: Option<NaiveDate>,
        pub phone_number: Option<String>,
        pub address: Option<String>,
        pub spouse: Vec<Spouse>,
        pub spouse_index: u32,
        pub parent: Option<String>,
        /// Existing members to re-parent under the new member.
        pub children: Vec<String>,
        pub custom_fields: Vec<CustomField>,
        /// Set by the suggestion applier so approved additions join the
        /// shared tree immediately; plain creates leave this empty and rely
        /// on the share-code sync instead.
        pub view_code: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateMemberResult {
        pub member: Member,
    }

    /// Partial update; `None` fields are left untouched.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateMemberCommand {
        pub owner_id: String,
        pub member_id: String,
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

    #[derive(Debug, Clone)]
    pub struct UpdateMemberResult {
        pub member: Member,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteMemberCommand {
        pub owner_id: String,
        pub member_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteMemberResult {
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct MemberListResult {
        pub members: Vec<Member>,
    }

    #[derive(Debug, Clone)]
    pub struct FlatMemberListResult {
        pub members: Vec<MemberRef>,
    }

    #[derive(Debug, Clone)]
    pub struct FamilyTreeResult {
        pub forest: Vec<TreeNode>,
    }
}

pub mod suggestions {
    use crate::domain::models::suggestion::Suggestion;
    use shared::{EditMemberData, NewMemberData, ReportData, Submitter, SuggestionKind, SuggestionStatus};

    /// Input for the public suggestion endpoint. No owner id: the tree owner
    /// is resolved from the view code.
    #[derive(Debug, Clone)]
    pub struct CreateSuggestionCommand {
        pub kind: SuggestionKind,
        pub view_code: String,
        pub new_member: Option<NewMemberData>,
        pub edit_member: Option<EditMemberData>,
        pub report: Option<ReportData>,
        pub submitter: Submitter,
    }

    #[derive(Debug, Clone)]
    pub struct CreateSuggestionResult {
        pub suggestion: Suggestion,
    }

    /// Query for the moderation list. `status: None` means every status.
    #[derive(Debug, Clone)]
    pub struct SuggestionListQuery {
        pub owner_id: String,
        pub status: Option<SuggestionStatus>,
    }

    #[derive(Debug, Clone)]
    pub struct SuggestionListResult {
        pub suggestions: Vec<Suggestion>,
    }

    /// Owner-scoped reference to one suggestion, shared by every moderation
    /// transition (approve, reject, revert, delete).
    #[derive(Debug, Clone)]
    pub struct ModerateSuggestionCommand {
        pub owner_id: String,
        pub suggestion_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct ModerateSuggestionResult {
        pub suggestion: Suggestion,
    }
}

pub mod sharing {
    /// Result of minting or backfilling a share code.
    #[derive(Debug, Clone)]
    pub struct ViewCodeResult {
        pub view_code: String,
        pub members_updated: u32,
    }
}
