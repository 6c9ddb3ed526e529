//! Derived tree structures
//!
//! `TreeNode` and `Forest` are rebuilt from scratch on every fetch and are never
//! patched incrementally. They own clones of the records they represent.

use crate::models::PersonRecord;
use serde::Serialize;

/// One placed member with its children and an optional spouse
///
/// The spouse is a leaf reference shown next to the member. It is never expanded
/// into a subtree of its own from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub member: PersonRecord,
    pub children: Vec<TreeNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse: Option<PersonRecord>,
}

impl TreeNode {
    pub fn new(member: PersonRecord, spouse: Option<PersonRecord>) -> Self {
        Self {
            member,
            children: Vec::new(),
            spouse,
        }
    }

    pub fn id(&self) -> &str {
        &self.member.id
    }

    /// Number of members in this subtree, spouses not counted
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order walk of this subtree
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// Pre-order iterator over tree nodes, driven by an explicit stack
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Ordered collection of independent trees
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forest {
    pub roots: Vec<TreeNode>,

    /// Ids of records left out because no root reaches them (parent cycles)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<String>,
}

impl Forest {
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of placed members across all trees
    pub fn member_count(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order walk across every tree, in forest order
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().flat_map(TreeNode::iter)
    }

    /// Find the node whose member has the given id
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.iter().find(|node| node.id() == id)
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots.iter().map(TreeNode::id).collect()
    }
}
