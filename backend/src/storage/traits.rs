//! Storage abstraction traits.
//!
//! The domain layer talks to member and suggestion collections through these
//! traits so the backing document store can change without touching business
//! logic. Operations are synchronous: every mutation is one short-lived,
//! independently committed call.

use anyhow::Result;

use crate::domain::models::member::Member;
use crate::domain::models::suggestion::Suggestion;
use shared::SuggestionStatus;

/// Interface for the member collection.
///
/// The store is a dumb document collection; parent/children back-link
/// maintenance lives in the member service, not here.
pub trait MemberStorage: Send + Sync {
    /// Store a new member document.
    fn store_member(&self, member: &Member) -> Result<()>;

    /// Retrieve a member by id regardless of owner.
    fn get_member(&self, member_id: &str) -> Result<Option<Member>>;

    /// Retrieve a member by id, scoped to one owner.
    fn get_member_for_owner(&self, owner_id: &str, member_id: &str) -> Result<Option<Member>>;

    /// Every member belonging to one owner, in insertion order.
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Member>>;

    /// Every member carrying one view code, in insertion order.
    fn list_by_view_code(&self, view_code: &str) -> Result<Vec<Member>>;

    /// Any single member carrying the given view code.
    fn find_any_by_view_code(&self, view_code: &str) -> Result<Option<Member>>;

    /// Any single member of this owner that already has a view code.
    fn find_any_with_view_code(&self, owner_id: &str) -> Result<Option<Member>>;

    /// Replace an existing member document.
    fn update_member(&self, member: &Member) -> Result<()>;

    /// Remove a member document. Returns true when something was deleted.
    fn delete_member(&self, member_id: &str) -> Result<bool>;

    /// Set the view code on every member of one owner. Returns the number
    /// of documents written.
    fn bulk_set_view_code(&self, owner_id: &str, view_code: &str) -> Result<u32>;

    /// Set the view code only on this owner's members that lack one.
    fn bulk_set_view_code_where_missing(&self, owner_id: &str, view_code: &str) -> Result<u32>;
}

/// Outcome of a guarded suggestion status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusTransition {
    /// The transition applied; carries the updated document.
    Applied(Suggestion),
    /// No suggestion with that id for that owner.
    Missing,
    /// The suggestion exists but its current status was not an expected one.
    WrongStatus(SuggestionStatus),
}

/// Interface for the suggestion collection.
pub trait SuggestionStorage: Send + Sync {
    /// Store a new suggestion document.
    fn store_suggestion(&self, suggestion: &Suggestion) -> Result<()>;

    /// Retrieve a suggestion by id, scoped to its tree owner.
    fn get_for_owner(&self, owner_id: &str, suggestion_id: &str) -> Result<Option<Suggestion>>;

    /// List an owner's suggestions, newest first, optionally filtered by
    /// status.
    fn list_by_owner(
        &self,
        owner_id: &str,
        status: Option<SuggestionStatus>,
    ) -> Result<Vec<Suggestion>>;

    /// Count an owner's suggestions in one status.
    fn count_by_status(&self, owner_id: &str, status: SuggestionStatus) -> Result<u32>;

    /// Atomically move a suggestion from one of the expected statuses to
    /// `to`. The check and the write happen under the same store lock, so
    /// two racing moderation calls cannot both succeed.
    fn transition_status(
        &self,
        owner_id: &str,
        suggestion_id: &str,
        expected: &[SuggestionStatus],
        to: SuggestionStatus,
    ) -> Result<StatusTransition>;

    /// Remove a suggestion document. Returns true when something was deleted.
    fn delete_suggestion(&self, owner_id: &str, suggestion_id: &str) -> Result<bool>;
}
