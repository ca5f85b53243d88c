use thiserror::Error;

/// Error taxonomy for every domain operation.
///
/// The HTTP layer maps each variant family to a status code; callers inside
/// the domain match on variants to distinguish bad input, lookup misses and
/// refused state transitions without string inspection.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Caller supplied missing or malformed input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// A member, suggestion or tree lookup missed.
    #[error("{0} not found")]
    NotFound(String),

    /// Deleting a member who still has children is refused outright.
    #[error("cannot delete a member who still has children")]
    MemberHasChildren,

    /// Approve/reject on a suggestion that already left the pending state.
    #[error("suggestion has already been processed")]
    SuggestionNotPending,

    /// Revert on a suggestion that is still pending.
    #[error("suggestion is still pending")]
    SuggestionAlreadyPending,

    /// Share-code operations need at least one member to attach the code to.
    #[error("no members in this family tree yet")]
    EmptyTree,

    /// Backfill requested before any share code was generated.
    #[error("no share code has been generated yet")]
    MissingViewCode,

    /// Opaque storage failure; surfaced as-is, never retried automatically.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TreeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TreeError::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        TreeError::NotFound(what.into())
    }
}
