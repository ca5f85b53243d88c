//! # Family Tree Backend
//!
//! Non-UI logic for the family tree service, layered the usual way:
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (services, tree logic)
//!     ↓
//! Storage Layer (JSON document store)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::domain::{EmailConfig, EmailService, ExportService, MemberService, ShareService, SuggestionService};
use crate::storage::json::JsonConnection;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub member_service: MemberService,
    pub share_service: ShareService,
    pub suggestion_service: SuggestionService,
    pub export_service: ExportService,
}

/// Initialize the backend with all required services.
pub fn initialize_backend<P: AsRef<Path>>(data_dir: P) -> Result<AppState> {
    info!("Setting up document store");
    let connection = Arc::new(JsonConnection::new(data_dir)?);

    info!("Setting up domain services");
    let member_service = MemberService::new(connection.clone());
    let share_service = ShareService::new(connection.clone());
    let email_service = EmailService::new(EmailConfig::from_env());
    let suggestion_service =
        SuggestionService::new(connection, member_service.clone(), email_service);
    let export_service = ExportService::new();

    Ok(AppState {
        member_service,
        share_service,
        suggestion_service,
        export_service,
    })
}
