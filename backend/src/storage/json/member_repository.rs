use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::debug;

use super::connection::JsonConnection;
use crate::domain::models::member::Member;
use crate::storage::traits::MemberStorage;

/// JSON-file-backed member repository.
#[derive(Clone)]
pub struct MemberRepository {
    connection: Arc<JsonConnection>,
}

impl MemberRepository {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self { connection }
    }

    fn load(&self) -> Result<Vec<Member>> {
        self.connection.read_collection(&self.connection.members_path())
    }

    fn save(&self, members: &[Member]) -> Result<()> {
        self.connection.write_collection(&self.connection.members_path(), members)
    }
}

impl MemberStorage for MemberRepository {
    fn store_member(&self, member: &Member) -> Result<()> {
        let _guard = self.connection.guard();
        let mut members = self.load()?;
        members.push(member.clone());
        self.save(&members)?;
        debug!("Stored member {}", member.id);
        Ok(())
    }

    fn get_member(&self, member_id: &str) -> Result<Option<Member>> {
        let _guard = self.connection.guard();
        Ok(self.load()?.into_iter().find(|m| m.id == member_id))
    }

    fn get_member_for_owner(&self, owner_id: &str, member_id: &str) -> Result<Option<Member>> {
        let _guard = self.connection.guard();
        Ok(self
            .load()?
            .into_iter()
            .find(|m| m.id == member_id && m.created_by == owner_id))
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Member>> {
        let _guard = self.connection.guard();
        Ok(self
            .load()?
            .into_iter()
            .filter(|m| m.created_by == owner_id)
            .collect())
    }

    fn list_by_view_code(&self, view_code: &str) -> Result<Vec<Member>> {
        let _guard = self.connection.guard();
        Ok(self
            .load()?
            .into_iter()
            .filter(|m| m.view_code.as_deref() == Some(view_code))
            .collect())
    }

    fn find_any_by_view_code(&self, view_code: &str) -> Result<Option<Member>> {
        let _guard = self.connection.guard();
        Ok(self
            .load()?
            .into_iter()
            .find(|m| m.view_code.as_deref() == Some(view_code)))
    }

    fn find_any_with_view_code(&self, owner_id: &str) -> Result<Option<Member>> {
        let _guard = self.connection.guard();
        Ok(self
            .load()?
            .into_iter()
            .find(|m| m.created_by == owner_id && m.view_code.is_some()))
    }

    fn update_member(&self, member: &Member) -> Result<()> {
        let _guard = self.connection.guard();
        let mut members = self.load()?;
        match members.iter_mut().find(|m| m.id == member.id) {
            Some(slot) => *slot = member.clone(),
            None => anyhow::bail!("Member not found for update: {}", member.id),
        }
        self.save(&members)?;
        debug!("Updated member {}", member.id);
        Ok(())
    }

    fn delete_member(&self, member_id: &str) -> Result<bool> {
        let _guard = self.connection.guard();
        let mut members = self.load()?;
        let before = members.len();
        members.retain(|m| m.id != member_id);
        let deleted = members.len() < before;
        if deleted {
            self.save(&members)?;
            debug!("Deleted member {}", member_id);
        }
        Ok(deleted)
    }

    fn bulk_set_view_code(&self, owner_id: &str, view_code: &str) -> Result<u32> {
        let _guard = self.connection.guard();
        let mut members = self.load()?;
        let mut updated = 0;
        for member in members.iter_mut().filter(|m| m.created_by == owner_id) {
            member.view_code = Some(view_code.to_string());
            member.updated_at = Utc::now();
            updated += 1;
        }
        if updated > 0 {
            self.save(&members)?;
        }
        Ok(updated)
    }

    fn bulk_set_view_code_where_missing(&self, owner_id: &str, view_code: &str) -> Result<u32> {
        let _guard = self.connection.guard();
        let mut members = self.load()?;
        let mut updated = 0;
        for member in members
            .iter_mut()
            .filter(|m| m.created_by == owner_id && m.view_code.is_none())
        {
            member.view_code = Some(view_code.to_string());
            member.updated_at = Utc::now();
            updated += 1;
        }
        if updated > 0 {
            self.save(&members)?;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{Gender, MaritalStatus};
    use tempfile::TempDir;

    fn setup() -> (MemberRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = JsonConnection::new(temp_dir.path()).unwrap();
        (MemberRepository::new(Arc::new(connection)), temp_dir)
    }

    fn member(id: &str, owner: &str) -> Member {
        let now = Utc::now();
        Member {
            id: id.to_string(),
            name: format!("Member {}", id),
            gender: Gender::Male,
            birthday: None,
            marital_status: MaritalStatus::Single,
            is_alive: true,
            death_date: None,
            phone_number: None,
            address: None,
            avatar: None,
            spouse: Vec::new(),
            spouse_index: 0,
            parent: None,
            children: Vec::new(),
            view_code: None,
            created_by: owner.to_string(),
            custom_fields: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_store_and_get_member() {
        let (repo, _dir) = setup();
        repo.store_member(&member("m1", "owner-a")).unwrap();

        let found = repo.get_member("m1").unwrap();
        assert_eq!(found.unwrap().id, "m1");
        assert!(repo.get_member("missing").unwrap().is_none());
    }

    #[test]
    fn test_owner_scoped_lookup() {
        let (repo, _dir) = setup();
        repo.store_member(&member("m1", "owner-a")).unwrap();

        assert!(repo.get_member_for_owner("owner-a", "m1").unwrap().is_some());
        assert!(repo.get_member_for_owner("owner-b", "m1").unwrap().is_none());
    }

    #[test]
    fn test_list_by_owner_filters() {
        let (repo, _dir) = setup();
        repo.store_member(&member("m1", "owner-a")).unwrap();
        repo.store_member(&member("m2", "owner-b")).unwrap();
        repo.store_member(&member("m3", "owner-a")).unwrap();

        let mine = repo.list_by_owner("owner-a").unwrap();
        let ids: Vec<&str> = mine.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
    }

    #[test]
    fn test_update_missing_member_fails() {
        let (repo, _dir) = setup();
        let err = repo.update_member(&member("ghost", "owner-a"));
        assert!(err.is_err());
    }

    #[test]
    fn test_delete_member_reports_outcome() {
        let (repo, _dir) = setup();
        repo.store_member(&member("m1", "owner-a")).unwrap();

        assert!(repo.delete_member("m1").unwrap());
        assert!(!repo.delete_member("m1").unwrap());
    }

    #[test]
    fn test_bulk_set_view_code_covers_all_owner_members() {
        let (repo, _dir) = setup();
        repo.store_member(&member("m1", "owner-a")).unwrap();
        repo.store_member(&member("m2", "owner-a")).unwrap();
        repo.store_member(&member("m3", "owner-b")).unwrap();

        let updated = repo.bulk_set_view_code("owner-a", "AB12CD34").unwrap();
        assert_eq!(updated, 2);

        let coded = repo.list_by_view_code("AB12CD34").unwrap();
        assert_eq!(coded.len(), 2);
        assert!(repo.list_by_owner("owner-b").unwrap()[0].view_code.is_none());
    }

    #[test]
    fn test_bulk_set_where_missing_preserves_existing_codes() {
        let (repo, _dir) = setup();
        let mut coded = member("m1", "owner-a");
        coded.view_code = Some("AB12CD34".to_string());
        repo.store_member(&coded).unwrap();
        repo.store_member(&member("m2", "owner-a")).unwrap();

        let updated = repo.bulk_set_view_code_where_missing("owner-a", "AB12CD34").unwrap();

        assert_eq!(updated, 1);
        assert_eq!(repo.list_by_view_code("AB12CD34").unwrap().len(), 2);
    }

    #[test]
    fn test_find_any_with_view_code() {
        let (repo, _dir) = setup();
        repo.store_member(&member("m1", "owner-a")).unwrap();
        assert!(repo.find_any_with_view_code("owner-a").unwrap().is_none());

        let mut coded = member("m2", "owner-a");
        coded.view_code = Some("ZZ99YY88".to_string());
        repo.store_member(&coded).unwrap();

        let found = repo.find_any_with_view_code("owner-a").unwrap().unwrap();
        assert_eq!(found.id, "m2");
    }
}
