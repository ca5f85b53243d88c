//! Translation between domain types and the wire DTOs in `shared`.

use crate::domain::commands::members::{CreateMemberCommand, UpdateMemberCommand};
use crate::domain::commands::suggestions::CreateSuggestionCommand;
use crate::domain::models::member::Member;
use crate::domain::models::suggestion::Suggestion;
use crate::domain::tree::TreeNode;

pub fn member_to_dto(member: Member) -> shared::Member {
    shared::Member {
        id: member.id,
        name: member.name,
        gender: member.gender,
        birthday: member.birthday,
        marital_status: member.marital_status,
        is_alive: member.is_alive,
        death_date: member.death_date,
        phone_number: member.phone_number,
        address: member.address,
        avatar: member.avatar,
        spouse: member.spouse,
        spouse_index: member.spouse_index,
        parent: member.parent,
        children: member.children,
        view_code: member.view_code,
        created_by: member.created_by,
        custom_fields: member.custom_fields,
        created_at: member.created_at,
        updated_at: member.updated_at,
    }
}

pub fn tree_node_to_dto(node: TreeNode) -> shared::TreeNode {
    shared::TreeNode {
        member: member_to_dto(node.member),
        children: node.children.into_iter().map(tree_node_to_dto).collect(),
    }
}

pub fn forest_to_dto(forest: Vec<TreeNode>) -> Vec<shared::TreeNode> {
    forest.into_iter().map(tree_node_to_dto).collect()
}

pub fn suggestion_to_dto(suggestion: Suggestion) -> shared::Suggestion {
    shared::Suggestion {
        id: suggestion.id,
        kind: suggestion.kind,
        status: suggestion.status,
        view_code: suggestion.view_code,
        tree_owner: suggestion.tree_owner,
        new_member: suggestion.new_member,
        edit_member: suggestion.edit_member,
        report: suggestion.report,
        submitter: suggestion.submitter,
        created_at: suggestion.created_at,
        updated_at: suggestion.updated_at,
    }
}

pub fn create_member_command(owner_id: String, request: shared::CreateMemberRequest) -> CreateMemberCommand {
    CreateMemberCommand {
        owner_id,
        name: request.name,
        gender: request.gender,
        birthday: request.birthday,
        marital_status: request.marital_status,
        is_alive: request.is_alive,
        death_date: request.death_date,
        phone_number: request.phone_number,
        address: request.address,
        spouse: request.spouse.unwrap_or_default(),
        spouse_index: request.spouse_index,
        parent: request.parent,
        children: request.children,
        custom_fields: request.custom_fields,
        view_code: None,
    }
}

pub fn update_member_command(
    owner_id: String,
    member_id: String,
    request: shared::UpdateMemberRequest,
) -> UpdateMemberCommand {
    UpdateMemberCommand {
        owner_id,
        member_id,
        name: request.name,
        gender: request.gender,
        birthday: request.birthday,
        marital_status: request.marital_status,
        is_alive: request.is_alive,
        death_date: request.death_date,
        phone_number: request.phone_number,
        address: request.address,
        avatar: request.avatar,
        spouse: request.spouse,
        spouse_index: request.spouse_index,
        custom_fields: request.custom_fields,
    }
}

pub fn create_suggestion_command(request: shared::CreateSuggestionRequest) -> CreateSuggestionCommand {
    CreateSuggestionCommand {
        kind: request.kind,
        view_code: request.view_code,
        new_member: request.new_member,
        edit_member: request.edit_member,
        report: request.report,
        submitter: request.submitter,
    }
}
