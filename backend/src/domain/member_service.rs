use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use log::{info, warn};
use shared::{MaritalStatus, MemberRef, TreeStats};

use crate::domain::commands::members::{
    CreateMemberCommand, CreateMemberResult, DeleteMemberCommand, DeleteMemberResult,
    FamilyTreeResult, FlatMemberListResult, MemberListResult, UpdateMemberCommand,
    UpdateMemberResult,
};
use crate::domain::errors::TreeError;
use crate::domain::models::member::Member;
use crate::domain::tree;
use crate::storage::json::{JsonConnection, MemberRepository};
use crate::storage::traits::MemberStorage;

/// Service owning the member collection.
///
/// Every structural mutation (create, re-parent, delete) goes through here
/// so both sides of the parent/children relationship are updated in one
/// logical operation; nothing else writes those fields.
#[derive(Clone)]
pub struct MemberService {
    members: MemberRepository,
}

impl MemberService {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self {
            members: MemberRepository::new(connection),
        }
    }

    /// Create a new member and wire up both sides of every relationship it
    /// declares.
    pub fn create_member(&self, command: CreateMemberCommand) -> Result<CreateMemberResult, TreeError> {
        info!("Creating member: name={}, owner={}", command.name, command.owner_id);

        self.validate_create_command(&command)?;

        let now = Utc::now();
        let member = Member {
            id: Member::generate_id(),
            name: command.name.trim().to_string(),
            gender: command.gender,
            birthday: command.birthday,
            marital_status: command.marital_status,
            is_alive: command.is_alive,
            // A living member never carries a death date.
            death_date: if command.is_alive { None } else { command.death_date },
            phone_number: command.phone_number,
            address: command.address,
            avatar: None,
            spouse: if command.marital_status == MaritalStatus::Married {
                command.spouse
            } else {
                Vec::new()
            },
            spouse_index: command.spouse_index,
            parent: command.parent.clone(),
            children: command.children.clone(),
            view_code: command.view_code,
            created_by: command.owner_id,
            custom_fields: command.custom_fields,
            created_at: now,
            updated_at: now,
        };

        self.members.store_member(&member)?;

        if let Some(parent_id) = &member.parent {
            match self.members.get_member(parent_id)? {
                Some(mut parent) => {
                    parent.children.push(member.id.clone());
                    parent.updated_at = now;
                    self.members.update_member(&parent)?;
                }
                None => warn!(
                    "Parent {} not found while linking new member {}",
                    parent_id, member.id
                ),
            }
        }

        for child_id in &command.children {
            match self.members.get_member(child_id)? {
                Some(mut child) => {
                    self.detach_from_previous_parent(&child)?;
                    child.parent = Some(member.id.clone());
                    child.updated_at = now;
                    self.members.update_member(&child)?;
                }
                None => warn!(
                    "Child {} not found while linking new member {}",
                    child_id, member.id
                ),
            }
        }

        info!("Created member {} ({})", member.name, member.id);
        Ok(CreateMemberResult { member })
    }

    pub fn get_member(&self, owner_id: &str, member_id: &str) -> Result<Member, TreeError> {
        self.members
            .get_member_for_owner(owner_id, member_id)?
            .ok_or_else(|| TreeError::not_found("Member"))
    }

    pub fn list_members(&self, owner_id: &str) -> Result<MemberListResult, TreeError> {
        let members = self.members.list_by_owner(owner_id)?;
        Ok(MemberListResult { members })
    }

    /// Id + name pairs for parent pickers.
    pub fn list_flat(&self, owner_id: &str) -> Result<FlatMemberListResult, TreeError> {
        let members = self
            .members
            .list_by_owner(owner_id)?
            .into_iter()
            .map(|m| MemberRef { id: m.id, name: m.name })
            .collect();
        Ok(FlatMemberListResult { members })
    }

    /// Materialize the owner's flat member list into a forest.
    pub fn family_tree(&self, owner_id: &str) -> Result<FamilyTreeResult, TreeError> {
        let members = self.members.list_by_owner(owner_id)?;
        Ok(FamilyTreeResult {
            forest: tree::materialize(&members),
        })
    }

    pub fn tree_stats(&self, owner_id: &str) -> Result<TreeStats, TreeError> {
        let result = self.family_tree(owner_id)?;
        Ok(tree::compute_stats(&result.forest))
    }

    /// Apply a partial update to one member.
    pub fn update_member(&self, command: UpdateMemberCommand) -> Result<UpdateMemberResult, TreeError> {
        info!("Updating member: {}", command.member_id);

        let mut member = self.get_member(&command.owner_id, &command.member_id)?;

        if let Some(ref name) = command.name {
            if name.trim().is_empty() {
                return Err(TreeError::validation("Member name cannot be empty"));
            }
            member.name = name.trim().to_string();
        }
        if let Some(gender) = command.gender {
            member.gender = gender;
        }
        if let Some(birthday) = command.birthday {
            member.birthday = Some(birthday);
        }
        if let Some(status) = command.marital_status {
            member.marital_status = status;
        }
        if let Some(is_alive) = command.is_alive {
            member.is_alive = is_alive;
        }
        if let Some(death_date) = command.death_date {
            member.death_date = Some(death_date);
        }
        if let Some(phone_number) = command.phone_number {
            member.phone_number = Some(phone_number);
        }
        if let Some(address) = command.address {
            member.address = Some(address);
        }
        if let Some(avatar) = command.avatar {
            member.avatar = Some(avatar);
        }
        if let Some(spouse) = command.spouse {
            member.spouse = spouse;
        }
        if let Some(spouse_index) = command.spouse_index {
            member.spouse_index = spouse_index;
        }
        if let Some(custom_fields) = command.custom_fields {
            member.custom_fields = custom_fields;
        }

        // A deceased member must carry a death date; default to today when
        // the update left it unset.
        if !member.is_alive && member.death_date.is_none() {
            member.death_date = Some(Utc::now().date_naive());
        }
        // Spouses are only meaningful while married.
        if member.marital_status != MaritalStatus::Married {
            member.spouse.clear();
        }

        member.updated_at = Utc::now();
        self.members.update_member(&member)?;

        info!("Updated member {} ({})", member.name, member.id);
        Ok(UpdateMemberResult { member })
    }

    /// Apply one approved edit-suggestion field to one member, coercing the
    /// string value to the field's type.
    pub fn apply_field_edit(
        &self,
        owner_id: &str,
        member_id: &str,
        field: &str,
        value: &str,
    ) -> Result<Member, TreeError> {
        let mut member = self.get_member(owner_id, member_id)?;

        match field {
            "name" => {
                if value.trim().is_empty() {
                    return Err(TreeError::validation("Member name cannot be empty"));
                }
                member.name = value.trim().to_string();
            }
            "birthday" => member.birthday = parse_date_value(value)?,
            "deathDate" | "death_date" => member.death_date = parse_date_value(value)?,
            "isAlive" | "is_alive" => member.is_alive = value == "true",
            "phoneNumber" | "phone_number" => member.phone_number = none_if_empty(value),
            "address" => member.address = none_if_empty(value),
            "maritalStatus" | "marital_status" => {
                member.marital_status = parse_marital_status(value)?;
                if member.marital_status != MaritalStatus::Married {
                    member.spouse.clear();
                }
            }
            other => {
                return Err(TreeError::validation(format!(
                    "Unsupported field for edit suggestion: {}",
                    other
                )))
            }
        }

        member.updated_at = Utc::now();
        self.members.update_member(&member)?;
        Ok(member)
    }

    /// Delete a member.
    ///
    /// Refused outright while the member has children; on the success path
    /// the member is first unlinked from its parent's child list and its own
    /// parent pointer cleared, then removed.
    pub fn delete_member(&self, command: DeleteMemberCommand) -> Result<DeleteMemberResult, TreeError> {
        info!("Deleting member: {}", command.member_id);

        let member = self.get_member(&command.owner_id, &command.member_id)?;

        if !member.children.is_empty() {
            return Err(TreeError::MemberHasChildren);
        }

        if let Some(parent_id) = &member.parent {
            if let Some(mut parent) = self.members.get_member(parent_id)? {
                parent.children.retain(|child_id| child_id != &member.id);
                parent.updated_at = Utc::now();
                self.members.update_member(&parent)?;
            }
        }

        let mut detached = member.clone();
        detached.parent = None;
        detached.updated_at = Utc::now();
        self.members.update_member(&detached)?;

        self.members.delete_member(&member.id)?;

        info!("Deleted member {} ({})", member.name, member.id);
        Ok(DeleteMemberResult {
            success_message: format!("Member '{}' deleted successfully", member.display_name()),
        })
    }

    fn detach_from_previous_parent(&self, child: &Member) -> Result<(), TreeError> {
        if let Some(old_parent_id) = &child.parent {
            if let Some(mut old_parent) = self.members.get_member(old_parent_id)? {
                old_parent.children.retain(|id| id != &child.id);
                old_parent.updated_at = Utc::now();
                self.members.update_member(&old_parent)?;
            }
        }
        Ok(())
    }

    fn validate_create_command(&self, command: &CreateMemberCommand) -> Result<(), TreeError> {
        if command.name.trim().is_empty() {
            return Err(TreeError::validation("Member name cannot be empty"));
        }
        if command.name.len() > 100 {
            return Err(TreeError::validation("Member name cannot exceed 100 characters"));
        }
        Ok(())
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a suggestion-supplied date string; empty clears the field. Accepts
/// plain dates and full RFC 3339 timestamps.
fn parse_date_value(value: &str) -> Result<Option<NaiveDate>, TreeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| TreeError::validation(format!("Invalid date value: {}", trimmed)))
}

fn parse_marital_status(value: &str) -> Result<MaritalStatus, TreeError> {
    match value.trim() {
        "single" => Ok(MaritalStatus::Single),
        "married" => Ok(MaritalStatus::Married),
        "divorced" => Ok(MaritalStatus::Divorced),
        "widowed" => Ok(MaritalStatus::Widowed),
        other => Err(TreeError::validation(format!(
            "Invalid marital status: {}",
            other
        ))),
    }
}
