use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::debug;
use shared::SuggestionStatus;

use super::connection::JsonConnection;
use crate::domain::models::suggestion::Suggestion;
use crate::storage::traits::{StatusTransition, SuggestionStorage};

/// JSON-file-backed suggestion repository.
#[derive(Clone)]
pub struct SuggestionRepository {
    connection: Arc<JsonConnection>,
}

impl SuggestionRepository {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self { connection }
    }

    fn load(&self) -> Result<Vec<Suggestion>> {
        self.connection.read_collection(&self.connection.suggestions_path())
    }

    fn save(&self, suggestions: &[Suggestion]) -> Result<()> {
        self.connection
            .write_collection(&self.connection.suggestions_path(), suggestions)
    }
}

impl SuggestionStorage for SuggestionRepository {
    fn store_suggestion(&self, suggestion: &Suggestion) -> Result<()> {
        let _guard = self.connection.guard();
        let mut suggestions = self.load()?;
        suggestions.push(suggestion.clone());
        self.save(&suggestions)?;
        debug!("Stored suggestion {}", suggestion.id);
        Ok(())
    }

    fn get_for_owner(&self, owner_id: &str, suggestion_id: &str) -> Result<Option<Suggestion>> {
        let _guard = self.connection.guard();
        Ok(self
            .load()?
            .into_iter()
            .find(|s| s.id == suggestion_id && s.tree_owner == owner_id))
    }

    fn list_by_owner(
        &self,
        owner_id: &str,
        status: Option<SuggestionStatus>,
    ) -> Result<Vec<Suggestion>> {
        let _guard = self.connection.guard();
        let mut suggestions: Vec<Suggestion> = self
            .load()?
            .into_iter()
            .filter(|s| s.tree_owner == owner_id)
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .collect();
        // Newest first for the moderation queue.
        suggestions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(suggestions)
    }

    fn count_by_status(&self, owner_id: &str, status: SuggestionStatus) -> Result<u32> {
        let _guard = self.connection.guard();
        Ok(self
            .load()?
            .iter()
            .filter(|s| s.tree_owner == owner_id && s.status == status)
            .count() as u32)
    }

    fn transition_status(
        &self,
        owner_id: &str,
        suggestion_id: &str,
        expected: &[SuggestionStatus],
        to: SuggestionStatus,
    ) -> Result<StatusTransition> {
        let _guard = self.connection.guard();
        let mut suggestions = self.load()?;

        let slot = suggestions
            .iter_mut()
            .find(|s| s.id == suggestion_id && s.tree_owner == owner_id);

        let outcome = match slot {
            None => StatusTransition::Missing,
            Some(suggestion) if !expected.contains(&suggestion.status) => {
                StatusTransition::WrongStatus(suggestion.status)
            }
            Some(suggestion) => {
                suggestion.status = to;
                suggestion.updated_at = Utc::now();
                StatusTransition::Applied(suggestion.clone())
            }
        };

        if let StatusTransition::Applied(ref applied) = outcome {
            self.save(&suggestions)?;
            debug!("Suggestion {} moved to {}", applied.id, applied.status);
        }
        Ok(outcome)
    }

    fn delete_suggestion(&self, owner_id: &str, suggestion_id: &str) -> Result<bool> {
        let _guard = self.connection.guard();
        let mut suggestions = self.load()?;
        let before = suggestions.len();
        suggestions.retain(|s| !(s.id == suggestion_id && s.tree_owner == owner_id));
        let deleted = suggestions.len() < before;
        if deleted {
            self.save(&suggestions)?;
            debug!("Deleted suggestion {}", suggestion_id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::{Submitter, SuggestionKind};
    use tempfile::TempDir;

    fn setup() -> (SuggestionRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = JsonConnection::new(temp_dir.path()).unwrap();
        (SuggestionRepository::new(Arc::new(connection)), temp_dir)
    }

    fn suggestion(id: &str, owner: &str, status: SuggestionStatus) -> Suggestion {
        let now = Utc::now();
        Suggestion {
            id: id.to_string(),
            kind: SuggestionKind::Report,
            status,
            view_code: "AB12CD34".to_string(),
            tree_owner: owner.to_string(),
            new_member: None,
            edit_member: None,
            report: None,
            submitter: Submitter {
                name: "Visitor".to_string(),
                ..Submitter::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_list_is_newest_first_and_filtered() {
        let (repo, _dir) = setup();
        let mut older = suggestion("s1", "owner-a", SuggestionStatus::Pending);
        older.created_at = Utc::now() - Duration::hours(2);
        repo.store_suggestion(&older).unwrap();
        repo.store_suggestion(&suggestion("s2", "owner-a", SuggestionStatus::Approved)).unwrap();
        repo.store_suggestion(&suggestion("s3", "owner-b", SuggestionStatus::Pending)).unwrap();

        let all = repo.list_by_owner("owner-a", None).unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1"]);

        let pending = repo
            .list_by_owner("owner-a", Some(SuggestionStatus::Pending))
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "s1");
    }

    #[test]
    fn test_count_by_status() {
        let (repo, _dir) = setup();
        repo.store_suggestion(&suggestion("s1", "owner-a", SuggestionStatus::Pending)).unwrap();
        repo.store_suggestion(&suggestion("s2", "owner-a", SuggestionStatus::Pending)).unwrap();
        repo.store_suggestion(&suggestion("s3", "owner-a", SuggestionStatus::Rejected)).unwrap();

        assert_eq!(repo.count_by_status("owner-a", SuggestionStatus::Pending).unwrap(), 2);
        assert_eq!(repo.count_by_status("owner-b", SuggestionStatus::Pending).unwrap(), 0);
    }

    #[test]
    fn test_transition_applies_only_from_expected_status() {
        let (repo, _dir) = setup();
        repo.store_suggestion(&suggestion("s1", "owner-a", SuggestionStatus::Pending)).unwrap();

        let first = repo
            .transition_status(
                "owner-a",
                "s1",
                &[SuggestionStatus::Pending],
                SuggestionStatus::Approved,
            )
            .unwrap();
        assert!(matches!(first, StatusTransition::Applied(_)));

        let second = repo
            .transition_status(
                "owner-a",
                "s1",
                &[SuggestionStatus::Pending],
                SuggestionStatus::Approved,
            )
            .unwrap();
        assert_eq!(second, StatusTransition::WrongStatus(SuggestionStatus::Approved));
    }

    #[test]
    fn test_transition_is_owner_scoped() {
        let (repo, _dir) = setup();
        repo.store_suggestion(&suggestion("s1", "owner-a", SuggestionStatus::Pending)).unwrap();

        let outcome = repo
            .transition_status(
                "owner-b",
                "s1",
                &[SuggestionStatus::Pending],
                SuggestionStatus::Approved,
            )
            .unwrap();
        assert_eq!(outcome, StatusTransition::Missing);
    }

    #[test]
    fn test_delete_suggestion() {
        let (repo, _dir) = setup();
        repo.store_suggestion(&suggestion("s1", "owner-a", SuggestionStatus::Pending)).unwrap();

        assert!(!repo.delete_suggestion("owner-b", "s1").unwrap());
        assert!(repo.delete_suggestion("owner-a", "s1").unwrap());
        assert!(repo.get_for_owner("owner-a", "s1").unwrap().is_none());
    }
}
