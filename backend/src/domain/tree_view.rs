//! Interactive view state over a materialized family tree.
//!
//! A [`TreeView`] holds the per-instance interaction state (collapsed nodes,
//! search term, female filter) and renders a forest of [`TreeNode`]s into
//! [`RenderNode`]s that a presentation layer can draw directly: search-driven
//! visibility resolved, children ordered, half-sibling sets grouped by
//! spouse, and the add-child affordance decided per node.

use std::collections::HashSet;

use shared::{Gender, MaritalStatus};

use crate::domain::tree::TreeNode;

/// Interaction state for one rendered tree instance.
///
/// All state is display-only; rendering never mutates the underlying forest
/// or the stored members.
#[derive(Debug, Clone, Default)]
pub struct TreeView {
    collapsed: HashSet<String>,
    search_term: String,
    hide_female: bool,
}

/// A node ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: String,
    /// Full stored name, "-"-packing included.
    pub name: String,
    /// Display form of the name (lineage part plus home part).
    pub display_name: String,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub is_alive: bool,
    /// Root = 0; presentation tiers (colors, indent) key off this.
    pub depth: usize,
    /// Which spouse of the parent this node descends from.
    pub spouse_index: u32,
    /// The node's own name contains the search term.
    pub highlighted: bool,
    pub collapsed: bool,
    /// Direct children surviving the female filter, collapsed or not.
    pub child_count: usize,
    pub can_add_child: bool,
    pub children: RenderChildren,
}

/// How a node's children render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderChildren {
    /// Subtree hidden by a collapse toggle.
    Collapsed,
    /// Single (or no) spouse: one flat ordered list.
    Flat(Vec<RenderNode>),
    /// More than one spouse: children partitioned by descent line.
    GroupedBySpouse(Vec<SpouseGroup>),
}

/// One labelled half-sibling set under a multi-spouse node.
#[derive(Debug, Clone, PartialEq)]
pub struct SpouseGroup {
    pub spouse_index: u32,
    pub label: String,
    pub children: Vec<RenderNode>,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the collapsed state of one node.
    pub fn toggle_collapse(&mut self, node_id: &str) {
        if !self.collapsed.remove(node_id) {
            self.collapsed.insert(node_id.to_string());
        }
    }

    pub fn is_collapsed(&self, node_id: &str) -> bool {
        self.collapsed.contains(node_id)
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Update the search term. A non-empty term clears every collapse so
    /// matches deep in the tree are reachable; this is an override of the
    /// collapse state, not a merge.
    pub fn set_search_term(&mut self, term: &str) {
        if !term.trim().is_empty() {
            self.collapsed.clear();
        }
        self.search_term = term.to_string();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Toggle the female display filter. Stored data is never touched.
    pub fn set_hide_female(&mut self, hide: bool) {
        self.hide_female = hide;
    }

    pub fn hide_female(&self) -> bool {
        self.hide_female
    }

    /// Render the forest under the current interaction state.
    pub fn render(&self, forest: &[TreeNode]) -> Vec<RenderNode> {
        let term = self.search_term.trim().to_lowercase();

        // Bottom-up reachability: a node is in the set when its own name
        // matches or any descendant's does. Computed once per render so the
        // walk below stays linear.
        let mut reachable = HashSet::new();
        if !term.is_empty() {
            for root in forest {
                collect_matches(root, &term, &mut reachable);
            }
        }

        forest
            .iter()
            .filter_map(|root| self.render_node(root, None, 0, &term, &reachable, false))
            .collect()
    }

    fn render_node(
        &self,
        node: &TreeNode,
        parent_gender: Option<Gender>,
        depth: usize,
        term: &str,
        reachable: &HashSet<String>,
        parent_matched: bool,
    ) -> Option<RenderNode> {
        let member = &node.member;

        // Search filter first: once an ancestor matched, the whole subtree
        // renders without re-filtering.
        if !term.is_empty() && !parent_matched && !reachable.contains(&member.id) {
            return None;
        }

        // Female filter applies to whatever list is about to render,
        // after search filtering and before spouse grouping.
        if self.hide_female && member.gender == Gender::Female {
            return None;
        }

        let highlighted = !term.is_empty() && member.name.to_lowercase().contains(term);
        let collapsed = self.collapsed.contains(&member.id);
        let descendants_unfiltered = parent_matched || highlighted;

        let child_count = node
            .children
            .iter()
            .filter(|c| !(self.hide_female && c.member.gender == Gender::Female))
            .count();

        let children = if collapsed {
            RenderChildren::Collapsed
        } else {
            let mut ordered: Vec<&TreeNode> = node.children.iter().collect();
            sort_children(&mut ordered);

            let rendered: Vec<RenderNode> = ordered
                .into_iter()
                .filter_map(|child| {
                    self.render_node(
                        child,
                        Some(member.gender),
                        depth + 1,
                        term,
                        reachable,
                        descendants_unfiltered,
                    )
                })
                .collect();

            if member.spouse.len() > 1 {
                RenderChildren::GroupedBySpouse(group_by_spouse(member, rendered))
            } else {
                RenderChildren::Flat(rendered)
            }
        };

        // Descendants are only added through the father's line after the
        // first generation split, and a deceased single person cannot gain
        // new descendants. The gender checked is the parent's, not the
        // node's own.
        let can_add_child = parent_gender != Some(Gender::Female)
            && !(member.marital_status == MaritalStatus::Single && !member.is_alive);

        Some(RenderNode {
            id: member.id.clone(),
            name: member.name.clone(),
            display_name: member.display_name(),
            gender: member.gender,
            marital_status: member.marital_status,
            is_alive: member.is_alive,
            depth,
            spouse_index: member.spouse_index,
            highlighted,
            collapsed,
            child_count,
            can_add_child,
            children,
        })
    }
}

fn collect_matches(node: &TreeNode, term: &str, reachable: &mut HashSet<String>) -> bool {
    let self_match = node.member.name.to_lowercase().contains(term);

    let mut child_match = false;
    for child in &node.children {
        // No short-circuit: every subtree must be visited to fill the set.
        child_match |= collect_matches(child, term, reachable);
    }

    if self_match || child_match {
        reachable.insert(node.member.id.clone());
        return true;
    }
    false
}

/// Order siblings by descent line first, then age. The comparator treats any
/// pair with a missing birthday as equal, so the stable sort keeps those in
/// encountered order.
fn sort_children(children: &mut [&TreeNode]) {
    children.sort_by(|a, b| {
        a.member
            .spouse_index
            .cmp(&b.member.spouse_index)
            .then_with(|| match (a.member.birthday, b.member.birthday) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => std::cmp::Ordering::Equal,
            })
    });
}

fn group_by_spouse(
    parent: &crate::domain::models::member::Member,
    rendered: Vec<RenderNode>,
) -> Vec<SpouseGroup> {
    let mut groups: Vec<SpouseGroup> = Vec::new();

    for child in rendered {
        match groups.last_mut() {
            Some(group) if group.spouse_index == child.spouse_index => {
                group.children.push(child);
            }
            _ => groups.push(SpouseGroup {
                spouse_index: child.spouse_index,
                label: String::new(),
                children: vec![child],
            }),
        }
    }

    for group in &mut groups {
        let count = group.children.len();
        group.label = match parent.spouse.get(group.spouse_index as usize) {
            Some(spouse) => format!(
                "Spouse {}: {} ({} children)",
                group.spouse_index + 1,
                spouse.name,
                count
            ),
            None => format!("Spouse {} ({} children)", group.spouse_index + 1, count),
        };
    }

    groups
}
