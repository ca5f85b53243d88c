use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::domain::commands::members::FamilyTreeResult;
use crate::domain::commands::sharing::ViewCodeResult;
use crate::domain::errors::TreeError;
use crate::domain::tree;
use crate::storage::json::{JsonConnection, MemberRepository};
use crate::storage::traits::MemberStorage;

/// Share-code gateway: mints read-only view codes and serves the code-keyed
/// read path that carries no ownership check.
#[derive(Clone)]
pub struct ShareService {
    members: MemberRepository,
}

impl ShareService {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self {
            members: MemberRepository::new(connection),
        }
    }

    /// Mint a fresh code and stamp it on every member of this owner. Always
    /// replaces an existing code; links handed out earlier stop working.
    pub fn generate_view_code(&self, owner_id: &str) -> Result<ViewCodeResult, TreeError> {
        let members = self.members.list_by_owner(owner_id)?;
        if members.is_empty() {
            return Err(TreeError::EmptyTree);
        }

        let view_code = new_view_code();
        let members_updated = self.members.bulk_set_view_code(owner_id, &view_code)?;

        info!(
            "Generated view code {} for owner {} ({} members)",
            view_code, owner_id, members_updated
        );
        Ok(ViewCodeResult {
            view_code,
            members_updated,
        })
    }

    /// Backfill the existing code onto members created before it existed.
    pub fn sync_view_code(&self, owner_id: &str) -> Result<ViewCodeResult, TreeError> {
        let carrier = self
            .members
            .find_any_with_view_code(owner_id)?
            .ok_or(TreeError::MissingViewCode)?;

        // The carrier is guaranteed to have a code by the query above.
        let view_code = carrier.view_code.unwrap_or_default();
        let members_updated = self
            .members
            .bulk_set_view_code_where_missing(owner_id, &view_code)?;

        info!(
            "Synced view code {} for owner {} ({} members backfilled)",
            view_code, owner_id, members_updated
        );
        Ok(ViewCodeResult {
            view_code,
            members_updated,
        })
    }

    /// The owner's current code, if any member carries one. Absence is a
    /// normal state for new accounts, not an error.
    pub fn current_view_code(&self, owner_id: &str) -> Result<Option<String>, TreeError> {
        Ok(self
            .members
            .find_any_with_view_code(owner_id)?
            .and_then(|m| m.view_code))
    }

    /// Materialize the tree behind a view code. Identical to the owner read
    /// path but keyed by code membership; no authentication involved.
    pub fn tree_by_view_code(&self, view_code: &str) -> Result<FamilyTreeResult, TreeError> {
        let members = self.members.list_by_view_code(view_code)?;
        Ok(FamilyTreeResult {
            forest: tree::materialize(&members),
        })
    }
}

/// Short opaque code, e.g. "A1B2C3D4".
fn new_view_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::members::CreateMemberCommand;
    use crate::domain::member_service::MemberService;
    use shared::{Gender, MaritalStatus};
    use tempfile::{tempdir, TempDir};

    const OWNER: &str = "user-1";

    fn setup_test() -> (ShareService, MemberService, TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = Arc::new(JsonConnection::new(temp_dir.path()).unwrap());
        (
            ShareService::new(conn.clone()),
            MemberService::new(conn),
            temp_dir,
        )
    }

    fn create_command(name: &str, parent: Option<String>) -> CreateMemberCommand {
        CreateMemberCommand {
            owner_id: OWNER.to_string(),
            name: name.to_string(),
            gender: Gender::Male,
            birthday: None,
            marital_status: MaritalStatus::Single,
            is_alive: true,
            death_date: None,
            phone_number: None,
            address: None,
            spouse: Vec::new(),
            spouse_index: 0,
            parent,
            children: Vec::new(),
            custom_fields: Vec::new(),
            view_code: None,
        }
    }

    #[test]
    fn test_generate_requires_members() {
        let (share, _members, _dir) = setup_test();
        let result = share.generate_view_code(OWNER);
        assert!(matches!(result, Err(TreeError::EmptyTree)));
    }

    #[test]
    fn test_generate_covers_all_members_and_replaces_old_code() {
        let (share, members, _dir) = setup_test();
        members.create_member(create_command("A", None)).unwrap();
        members.create_member(create_command("B", None)).unwrap();

        let first = share.generate_view_code(OWNER).unwrap();
        assert_eq!(first.members_updated, 2);
        assert_eq!(first.view_code.len(), 8);

        let second = share.generate_view_code(OWNER).unwrap();
        assert_ne!(first.view_code, second.view_code);

        // The old code no longer resolves to anything.
        let stale = share.tree_by_view_code(&first.view_code).unwrap();
        assert!(stale.forest.is_empty());
        let fresh = share.tree_by_view_code(&second.view_code).unwrap();
        assert_eq!(fresh.forest.len(), 2);
    }

    #[test]
    fn test_sync_backfills_members_created_after_generation() {
        let (share, members, _dir) = setup_test();
        members.create_member(create_command("Early", None)).unwrap();
        let generated = share.generate_view_code(OWNER).unwrap();

        members.create_member(create_command("Late", None)).unwrap();
        assert_eq!(share.tree_by_view_code(&generated.view_code).unwrap().forest.len(), 1);

        let synced = share.sync_view_code(OWNER).unwrap();
        assert_eq!(synced.view_code, generated.view_code);
        assert_eq!(synced.members_updated, 1);
        assert_eq!(share.tree_by_view_code(&generated.view_code).unwrap().forest.len(), 2);
    }

    #[test]
    fn test_sync_without_any_code_fails() {
        let (share, members, _dir) = setup_test();
        members.create_member(create_command("A", None)).unwrap();

        let result = share.sync_view_code(OWNER);
        assert!(matches!(result, Err(TreeError::MissingViewCode)));
    }

    #[test]
    fn test_current_view_code_absent_is_none() {
        let (share, members, _dir) = setup_test();
        members.create_member(create_command("A", None)).unwrap();

        assert!(share.current_view_code(OWNER).unwrap().is_none());

        let generated = share.generate_view_code(OWNER).unwrap();
        assert_eq!(share.current_view_code(OWNER).unwrap(), Some(generated.view_code));
    }

    #[test]
    fn test_tree_by_view_code_materializes_structure() {
        let (share, members, _dir) = setup_test();
        let root = members.create_member(create_command("Root", None)).unwrap().member;
        members
            .create_member(create_command("Child", Some(root.id.clone())))
            .unwrap();
        let generated = share.generate_view_code(OWNER).unwrap();

        let result = share.tree_by_view_code(&generated.view_code).unwrap();
        assert_eq!(result.forest.len(), 1);
        assert_eq!(result.forest[0].children.len(), 1);
    }
}
