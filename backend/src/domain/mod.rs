//! # Domain Module
//!
//! Business logic for the family tree service: the member collection with
//! its relationship invariants, tree materialization and statistics, the
//! interactive view state machine, share codes, and the suggestion
//! moderation workflow. Everything here is storage-agnostic and UI-agnostic;
//! services receive explicit owner ids instead of reading ambient request
//! state.

pub mod commands;
pub mod email_service;
pub mod errors;
pub mod export_service;
pub mod member_service;
pub mod models;
pub mod share_service;
pub mod suggestion_service;
pub mod tree;
pub mod tree_view;

pub use email_service::{EmailConfig, EmailService};
pub use errors::TreeError;
pub use export_service::ExportService;
pub use member_service::MemberService;
pub use share_service::ShareService;
pub use suggestion_service::SuggestionService;
