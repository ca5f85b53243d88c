use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use shared::{Gender, SuggestionKind, SuggestionStatus};

use crate::domain::commands::members::CreateMemberCommand;
use crate::domain::commands::suggestions::{
    CreateSuggestionCommand, CreateSuggestionResult, ModerateSuggestionCommand,
    ModerateSuggestionResult, SuggestionListQuery, SuggestionListResult,
};
use crate::domain::email_service::EmailService;
use crate::domain::errors::TreeError;
use crate::domain::member_service::MemberService;
use crate::domain::models::suggestion::Suggestion;
use crate::storage::json::{JsonConnection, MemberRepository, SuggestionRepository};
use crate::storage::traits::{MemberStorage, StatusTransition, SuggestionStorage};

/// Moderation workflow for anonymous change proposals.
///
/// Approving a suggestion mutates the same member collection the tree read
/// path consumes, through the member service so relationship back-links stay
/// consistent.
#[derive(Clone)]
pub struct SuggestionService {
    suggestions: SuggestionRepository,
    members: MemberRepository,
    member_service: MemberService,
    email_service: EmailService,
}

impl SuggestionService {
    pub fn new(
        connection: Arc<JsonConnection>,
        member_service: MemberService,
        email_service: EmailService,
    ) -> Self {
        Self {
            suggestions: SuggestionRepository::new(connection.clone()),
            members: MemberRepository::new(connection),
            member_service,
            email_service,
        }
    }

    /// Public entry point: anyone holding a valid view code may submit.
    pub fn create_suggestion(
        &self,
        command: CreateSuggestionCommand,
    ) -> Result<CreateSuggestionResult, TreeError> {
        if command.view_code.trim().is_empty() || command.submitter.name.trim().is_empty() {
            return Err(TreeError::validation("Missing required suggestion fields"));
        }

        // Resolve the tree owner from the code; denormalized so moderation
        // queries never resolve it again.
        let carrier = self
            .members
            .find_any_by_view_code(&command.view_code)?
            .ok_or_else(|| TreeError::not_found("Family tree"))?;

        let now = Utc::now();
        let suggestion = Suggestion {
            id: Suggestion::generate_id(),
            kind: command.kind,
            status: SuggestionStatus::Pending,
            view_code: command.view_code,
            tree_owner: carrier.created_by,
            new_member: command.new_member,
            edit_member: command.edit_member,
            report: command.report,
            submitter: command.submitter,
            created_at: now,
            updated_at: now,
        };

        self.suggestions.store_suggestion(&suggestion)?;
        info!(
            "Suggestion {} created for tree {} by {}",
            suggestion.id, suggestion.view_code, suggestion.submitter.name
        );

        self.email_service.notify_suggestion_received(&suggestion);

        Ok(CreateSuggestionResult { suggestion })
    }

    pub fn list_suggestions(&self, query: SuggestionListQuery) -> Result<SuggestionListResult, TreeError> {
        let suggestions = self.suggestions.list_by_owner(&query.owner_id, query.status)?;
        Ok(SuggestionListResult { suggestions })
    }

    pub fn count_pending(&self, owner_id: &str) -> Result<u32, TreeError> {
        Ok(self
            .suggestions
            .count_by_status(owner_id, SuggestionStatus::Pending)?)
    }

    /// Approve a pending suggestion and apply its change.
    ///
    /// The status moves pending to approved first, under the store lock, so a
    /// racing second approval loses before any data changes; if applying the
    /// payload then fails, the status is rolled back to pending and the error
    /// surfaces.
    pub fn approve(&self, command: ModerateSuggestionCommand) -> Result<ModerateSuggestionResult, TreeError> {
        info!("Approving suggestion {}", command.suggestion_id);

        let suggestion = self.transition(
            &command,
            &[SuggestionStatus::Pending],
            SuggestionStatus::Approved,
        )?;

        if let Err(e) = self.apply_approved(&suggestion) {
            if let Err(rollback) = self.suggestions.transition_status(
                &command.owner_id,
                &command.suggestion_id,
                &[SuggestionStatus::Approved],
                SuggestionStatus::Pending,
            ) {
                error!(
                    "Failed to roll back suggestion {} after apply error: {}",
                    command.suggestion_id, rollback
                );
            }
            return Err(e);
        }

        info!("Approved suggestion {}", suggestion.id);
        Ok(ModerateSuggestionResult { suggestion })
    }

    pub fn reject(&self, command: ModerateSuggestionCommand) -> Result<ModerateSuggestionResult, TreeError> {
        info!("Rejecting suggestion {}", command.suggestion_id);
        let suggestion = self.transition(
            &command,
            &[SuggestionStatus::Pending],
            SuggestionStatus::Rejected,
        )?;
        Ok(ModerateSuggestionResult { suggestion })
    }

    /// Put a processed suggestion back into the moderation queue. The data
    /// change an earlier approval made is not undone.
    pub fn revert(&self, command: ModerateSuggestionCommand) -> Result<ModerateSuggestionResult, TreeError> {
        info!("Reverting suggestion {}", command.suggestion_id);

        let outcome = self.suggestions.transition_status(
            &command.owner_id,
            &command.suggestion_id,
            &[SuggestionStatus::Approved, SuggestionStatus::Rejected],
            SuggestionStatus::Pending,
        )?;

        match outcome {
            StatusTransition::Applied(suggestion) => Ok(ModerateSuggestionResult { suggestion }),
            StatusTransition::Missing => Err(TreeError::not_found("Suggestion")),
            StatusTransition::WrongStatus(SuggestionStatus::Pending) => {
                Err(TreeError::SuggestionAlreadyPending)
            }
            StatusTransition::WrongStatus(other) => Err(TreeError::validation(format!(
                "Cannot revert suggestion from status {}",
                other
            ))),
        }
    }

    pub fn delete(&self, command: ModerateSuggestionCommand) -> Result<(), TreeError> {
        let deleted = self
            .suggestions
            .delete_suggestion(&command.owner_id, &command.suggestion_id)?;
        if !deleted {
            return Err(TreeError::not_found("Suggestion"));
        }
        info!("Deleted suggestion {}", command.suggestion_id);
        Ok(())
    }

    fn transition(
        &self,
        command: &ModerateSuggestionCommand,
        expected: &[SuggestionStatus],
        to: SuggestionStatus,
    ) -> Result<Suggestion, TreeError> {
        let outcome = self.suggestions.transition_status(
            &command.owner_id,
            &command.suggestion_id,
            expected,
            to,
        )?;

        match outcome {
            StatusTransition::Applied(suggestion) => Ok(suggestion),
            StatusTransition::Missing => Err(TreeError::not_found("Suggestion")),
            StatusTransition::WrongStatus(_) => Err(TreeError::SuggestionNotPending),
        }
    }

    /// Apply the data change an approval carries. Reports carry none.
    fn apply_approved(&self, suggestion: &Suggestion) -> Result<(), TreeError> {
        match suggestion.kind {
            SuggestionKind::Add => {
                if let Some(data) = &suggestion.new_member {
                    let command = CreateMemberCommand {
                        owner_id: suggestion.tree_owner.clone(),
                        name: data.name.clone().unwrap_or_default(),
                        gender: data.gender.unwrap_or(Gender::Male),
                        birthday: data.birthday,
                        marital_status: shared::MaritalStatus::Single,
                        is_alive: data.is_alive.unwrap_or(true),
                        death_date: data.death_date,
                        phone_number: data.phone_number.clone(),
                        address: data.address.clone(),
                        spouse: Vec::new(),
                        spouse_index: data.spouse_index.unwrap_or(0),
                        parent: data.parent_id.clone(),
                        children: Vec::new(),
                        custom_fields: Vec::new(),
                        view_code: Some(suggestion.view_code.clone()),
                    };
                    self.member_service.create_member(command)?;
                }
                Ok(())
            }
            SuggestionKind::Edit => {
                if let Some(data) = &suggestion.edit_member {
                    if let (Some(member_id), Some(field)) = (&data.member_id, &data.field) {
                        let value = data.new_value.clone().unwrap_or_default();
                        self.member_service.apply_field_edit(
                            &suggestion.tree_owner,
                            member_id,
                            field,
                            &value,
                        )?;
                    }
                }
                Ok(())
            }
            // Informational only; a human moderator acts on it.
            SuggestionKind::Report => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::share_service::ShareService;
    use shared::{EditMemberData, MaritalStatus, NewMemberData, ReportData, Submitter};
    use tempfile::{tempdir, TempDir};

    const OWNER: &str = "user-1";

    struct Fixture {
        service: SuggestionService,
        member_service: MemberService,
        share_service: ShareService,
        _dir: TempDir,
    }

    fn setup_test() -> Fixture {
        let temp_dir = tempdir().unwrap();
        let conn = Arc::new(JsonConnection::new(temp_dir.path()).unwrap());
        let member_service = MemberService::new(conn.clone());
        let share_service = ShareService::new(conn.clone());
        let service = SuggestionService::new(
            conn,
            member_service.clone(),
            EmailService::disabled(),
        );
        Fixture {
            service,
            member_service,
            share_service,
            _dir: temp_dir,
        }
    }

    fn create_root_command(name: &str) -> CreateMemberCommand {
        CreateMemberCommand {
            owner_id: OWNER.to_string(),
            name: name.to_string(),
            gender: Gender::Male,
            birthday: None,
            marital_status: MaritalStatus::Married,
            is_alive: true,
            death_date: None,
            phone_number: None,
            address: None,
            spouse: Vec::new(),
            spouse_index: 0,
            parent: None,
            children: Vec::new(),
            custom_fields: Vec::new(),
            view_code: None,
        }
    }

    /// Create one member, mint a share code, and return (member id, code).
    fn seed_shared_tree(fixture: &Fixture) -> (String, String) {
        let member = fixture
            .member_service
            .create_member(create_root_command("Root"))
            .unwrap()
            .member;
        let code = fixture.share_service.generate_view_code(OWNER).unwrap().view_code;
        (member.id, code)
    }

    fn submitter() -> Submitter {
        Submitter {
            name: "A Relative".to_string(),
            ..Submitter::default()
        }
    }

    fn report_command(view_code: &str) -> CreateSuggestionCommand {
        CreateSuggestionCommand {
            kind: SuggestionKind::Report,
            view_code: view_code.to_string(),
            new_member: None,
            edit_member: None,
            report: Some(ReportData {
                member_id: None,
                member_name: None,
                description: Some("Something is off".to_string()),
            }),
            submitter: submitter(),
        }
    }

    #[test]
    fn test_create_requires_submitter_name_and_valid_code() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);

        let mut nameless = report_command(&code);
        nameless.submitter.name = "  ".to_string();
        assert!(matches!(
            fixture.service.create_suggestion(nameless),
            Err(TreeError::Validation(_))
        ));

        let unknown_code = report_command("NOPE0000");
        assert!(matches!(
            fixture.service.create_suggestion(unknown_code),
            Err(TreeError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_denormalizes_tree_owner() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);

        let result = fixture.service.create_suggestion(report_command(&code)).unwrap();
        assert_eq!(result.suggestion.tree_owner, OWNER);
        assert_eq!(result.suggestion.status, SuggestionStatus::Pending);
    }

    #[test]
    fn test_approve_add_creates_member_with_defaults() {
        let fixture = setup_test();
        let (root_id, code) = seed_shared_tree(&fixture);

        let created = fixture
            .service
            .create_suggestion(CreateSuggestionCommand {
                kind: SuggestionKind::Add,
                view_code: code.clone(),
                new_member: Some(NewMemberData {
                    name: Some("New Cousin".to_string()),
                    parent_id: Some(root_id.clone()),
                    ..NewMemberData::default()
                }),
                edit_member: None,
                report: None,
                submitter: submitter(),
            })
            .unwrap()
            .suggestion;

        fixture
            .service
            .approve(ModerateSuggestionCommand {
                owner_id: OWNER.to_string(),
                suggestion_id: created.id,
            })
            .unwrap();

        let members = fixture.member_service.list_members(OWNER).unwrap().members;
        let cousin = members.iter().find(|m| m.name == "New Cousin").unwrap();
        assert_eq!(cousin.gender, Gender::Male);
        assert!(cousin.is_alive);
        assert_eq!(cousin.marital_status, MaritalStatus::Single);
        assert_eq!(cousin.view_code.as_deref(), Some(code.as_str()));
        assert_eq!(cousin.parent.as_deref(), Some(root_id.as_str()));

        let root = fixture.member_service.get_member(OWNER, &root_id).unwrap();
        assert!(root.children.contains(&cousin.id));
    }

    #[test]
    fn test_approve_edit_coerces_is_alive_to_bool() {
        let fixture = setup_test();
        let (root_id, code) = seed_shared_tree(&fixture);

        let created = fixture
            .service
            .create_suggestion(CreateSuggestionCommand {
                kind: SuggestionKind::Edit,
                view_code: code,
                new_member: None,
                edit_member: Some(EditMemberData {
                    member_id: Some(root_id.clone()),
                    field: Some("isAlive".to_string()),
                    new_value: Some("false".to_string()),
                    ..EditMemberData::default()
                }),
                report: None,
                submitter: submitter(),
            })
            .unwrap()
            .suggestion;

        fixture
            .service
            .approve(ModerateSuggestionCommand {
                owner_id: OWNER.to_string(),
                suggestion_id: created.id,
            })
            .unwrap();

        let root = fixture.member_service.get_member(OWNER, &root_id).unwrap();
        assert!(!root.is_alive);
    }

    #[test]
    fn test_approve_report_changes_status_only() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);
        let before = fixture.member_service.list_members(OWNER).unwrap().members;

        let created = fixture.service.create_suggestion(report_command(&code)).unwrap().suggestion;
        let approved = fixture
            .service
            .approve(ModerateSuggestionCommand {
                owner_id: OWNER.to_string(),
                suggestion_id: created.id,
            })
            .unwrap();

        assert_eq!(approved.suggestion.status, SuggestionStatus::Approved);
        let after = fixture.member_service.list_members(OWNER).unwrap().members;
        assert_eq!(before, after);
    }

    #[test]
    fn test_double_approval_fails_without_duplicating() {
        let fixture = setup_test();
        let (root_id, code) = seed_shared_tree(&fixture);

        let created = fixture
            .service
            .create_suggestion(CreateSuggestionCommand {
                kind: SuggestionKind::Add,
                view_code: code,
                new_member: Some(NewMemberData {
                    name: Some("Once Only".to_string()),
                    parent_id: Some(root_id),
                    ..NewMemberData::default()
                }),
                edit_member: None,
                report: None,
                submitter: submitter(),
            })
            .unwrap()
            .suggestion;

        let command = ModerateSuggestionCommand {
            owner_id: OWNER.to_string(),
            suggestion_id: created.id,
        };
        fixture.service.approve(command.clone()).unwrap();

        let second = fixture.service.approve(command);
        assert!(matches!(second, Err(TreeError::SuggestionNotPending)));

        let members = fixture.member_service.list_members(OWNER).unwrap().members;
        let copies = members.iter().filter(|m| m.name == "Once Only").count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn test_failed_apply_rolls_status_back_to_pending() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);

        // An add suggestion without a name cannot be applied.
        let created = fixture
            .service
            .create_suggestion(CreateSuggestionCommand {
                kind: SuggestionKind::Add,
                view_code: code,
                new_member: Some(NewMemberData::default()),
                edit_member: None,
                report: None,
                submitter: submitter(),
            })
            .unwrap()
            .suggestion;

        let command = ModerateSuggestionCommand {
            owner_id: OWNER.to_string(),
            suggestion_id: created.id.clone(),
        };
        let result = fixture.service.approve(command.clone());
        assert!(matches!(result, Err(TreeError::Validation(_))));

        // Still pending, so the owner can fix things up and retry.
        let listed = fixture
            .service
            .list_suggestions(SuggestionListQuery {
                owner_id: OWNER.to_string(),
                status: Some(SuggestionStatus::Pending),
            })
            .unwrap();
        assert!(listed.suggestions.iter().any(|s| s.id == created.id));
    }

    #[test]
    fn test_reject_and_revert_cycle() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);
        let created = fixture.service.create_suggestion(report_command(&code)).unwrap().suggestion;

        let command = ModerateSuggestionCommand {
            owner_id: OWNER.to_string(),
            suggestion_id: created.id.clone(),
        };

        let rejected = fixture.service.reject(command.clone()).unwrap();
        assert_eq!(rejected.suggestion.status, SuggestionStatus::Rejected);

        let reverted = fixture.service.revert(command.clone()).unwrap();
        assert_eq!(reverted.suggestion.status, SuggestionStatus::Pending);

        // Reverting an already-pending suggestion is refused.
        let again = fixture.service.revert(command);
        assert!(matches!(again, Err(TreeError::SuggestionAlreadyPending)));
    }

    #[test]
    fn test_reject_requires_pending() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);
        let created = fixture.service.create_suggestion(report_command(&code)).unwrap().suggestion;

        let command = ModerateSuggestionCommand {
            owner_id: OWNER.to_string(),
            suggestion_id: created.id,
        };
        fixture.service.reject(command.clone()).unwrap();

        assert!(matches!(
            fixture.service.reject(command),
            Err(TreeError::SuggestionNotPending)
        ));
    }

    #[test]
    fn test_count_pending_and_status_filter() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);

        let first = fixture.service.create_suggestion(report_command(&code)).unwrap().suggestion;
        fixture.service.create_suggestion(report_command(&code)).unwrap();

        assert_eq!(fixture.service.count_pending(OWNER).unwrap(), 2);

        fixture
            .service
            .reject(ModerateSuggestionCommand {
                owner_id: OWNER.to_string(),
                suggestion_id: first.id,
            })
            .unwrap();

        assert_eq!(fixture.service.count_pending(OWNER).unwrap(), 1);
        let rejected = fixture
            .service
            .list_suggestions(SuggestionListQuery {
                owner_id: OWNER.to_string(),
                status: Some(SuggestionStatus::Rejected),
            })
            .unwrap();
        assert_eq!(rejected.suggestions.len(), 1);
    }

    #[test]
    fn test_delete_suggestion() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);
        let created = fixture.service.create_suggestion(report_command(&code)).unwrap().suggestion;

        let command = ModerateSuggestionCommand {
            owner_id: OWNER.to_string(),
            suggestion_id: created.id,
        };
        fixture.service.delete(command.clone()).unwrap();
        assert!(matches!(
            fixture.service.delete(command),
            Err(TreeError::NotFound(_))
        ));
    }

    #[test]
    fn test_moderation_is_owner_scoped() {
        let fixture = setup_test();
        let (_root, code) = seed_shared_tree(&fixture);
        let created = fixture.service.create_suggestion(report_command(&code)).unwrap().suggestion;

        let foreign = ModerateSuggestionCommand {
            owner_id: "intruder".to_string(),
            suggestion_id: created.id,
        };
        assert!(matches!(
            fixture.service.approve(foreign),
            Err(TreeError::NotFound(_))
        ));
    }
}
