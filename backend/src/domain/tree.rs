//! Family tree materialization and statistics.
//!
//! Members are stored flat with parent-pointer references; everything the
//! presentation layer consumes is a forest of [`TreeNode`]s produced here.
//! Materialization is two passes over the flat list and never sorts --
//! ordering is a presentation concern handled by the view layer.

use std::collections::{HashMap, HashSet};

use log::warn;
use shared::{Gender, TreeStats};

use crate::domain::models::member::Member;

/// One node of the materialized forest: the member plus its children
/// embedded recursively, in flat-list encounter order.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub member: Member,
    pub children: Vec<TreeNode>,
}

/// Build a forest from a flat, parent-referencing member list.
///
/// First pass indexes the ids and buckets every member under its parent;
/// the second pass assembles nodes root-down. Roots are members without a
/// parent. A member whose parent id does not resolve in this snapshot is
/// promoted to a root: materialization must never fail on a dangling
/// reference, but the inconsistency is logged so it can be repaired.
pub fn materialize(flat: &[Member]) -> Vec<TreeNode> {
    let known: HashSet<&str> = flat.iter().map(|m| m.id.as_str()).collect();

    let mut child_lists: HashMap<&str, Vec<&Member>> = HashMap::new();
    let mut roots: Vec<&Member> = Vec::new();

    for member in flat {
        match member.parent.as_deref() {
            Some(parent_id) if known.contains(parent_id) => {
                child_lists.entry(parent_id).or_default().push(member);
            }
            Some(parent_id) => {
                warn!(
                    "Member {} references missing parent {}; treating as root",
                    member.id, parent_id
                );
                roots.push(member);
            }
            None => roots.push(member),
        }
    }

    roots
        .into_iter()
        .map(|member| build_node(member, &child_lists))
        .collect()
}

fn build_node(member: &Member, child_lists: &HashMap<&str, Vec<&Member>>) -> TreeNode {
    let children = child_lists
        .get(member.id.as_str())
        .map(|kids| kids.iter().map(|kid| build_node(kid, child_lists)).collect())
        .unwrap_or_default();

    TreeNode {
        member: member.clone(),
        children,
    }
}

/// Pre-order flattening of a forest.
pub fn flatten(forest: &[TreeNode]) -> Vec<&Member> {
    fn walk<'a>(node: &'a TreeNode, out: &mut Vec<&'a Member>) {
        out.push(&node.member);
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for root in forest {
        walk(root, &mut out);
    }
    out
}

/// Aggregate counts over a materialized forest.
///
/// `total_generations` is the longest root-to-leaf path with the root
/// counting as generation 1; an empty forest reports 0. Members missing
/// optional data are still counted.
pub fn compute_stats(forest: &[TreeNode]) -> TreeStats {
    let mut stats = TreeStats::default();

    for member in flatten(forest) {
        stats.total += 1;
        match member.gender {
            Gender::Male => stats.male += 1,
            Gender::Female => stats.female += 1,
        }
        if member.is_alive {
            stats.alive += 1;
        } else {
            stats.deceased += 1;
        }
    }

    stats.total_generations = forest.iter().map(depth).max().unwrap_or(0);
    stats
}

fn depth(node: &TreeNode) -> u32 {
    1 + node.children.iter().map(depth).max().unwrap_or(0)
}
