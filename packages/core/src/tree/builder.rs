//! Tree Builder
//!
//! Turns the flat, owner-scoped list of person records into an ordered forest.
//!
//! # Construction
//!
//! 1. Index once: `id → position` (first occurrence wins) and
//!    `parent id → [child positions]` in input order
//! 2. Pass 1: every record without a parent, in input order, starts a tree
//! 3. Pass 2: every record whose parent does not exist in the set is promoted
//!    to a root (orphan promotion), in input order
//! 4. Whatever is still unplaced sits on a parent cycle that no root reaches and
//!    is handled by [`CyclePolicy`]
//!
//! Expansion uses an explicit stack, so deep or malformed chains cannot exhaust
//! the call stack. A visited set guarantees each id is placed at most once.
//!
//! Sibling order is input order; nothing is sorted by name or date.
//!
//! # Examples
//!
//! ```rust
//! use familytree_core::models::{Gender, NewPerson, PersonRecord};
//! use familytree_core::tree::build_forest;
//! use chrono::NaiveDate;
//!
//! let dob = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
//! let parent = PersonRecord::from_new(NewPerson::new("Parent", dob, Gender::Other), "u");
//! let child = PersonRecord::from_new(
//!     NewPerson::new("Child", dob, Gender::Other).with_parent(parent.id.clone()),
//!     "u",
//! );
//!
//! let forest = build_forest(&[parent.clone(), child.clone()]);
//! assert_eq!(forest.len(), 1);
//! assert_eq!(forest.roots[0].children[0].member.id, child.id);
//! ```

use crate::models::{Forest, PersonRecord, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// What to do with records that only sit on parent cycles no root reaches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Leave them out of the forest and report their ids in `Forest::excluded`
    #[default]
    Exclude,

    /// Promote each still-unplaced record, in input order, to a root of its own.
    /// The rest of its cycle then hangs beneath it.
    PromoteAsRoot,
}

/// Options for [`build_forest_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
}

impl BuildOptions {
    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }
}

/// Build a forest with default options (cycle members excluded)
///
/// Never fails. An empty input yields an empty forest.
pub fn build_forest(records: &[PersonRecord]) -> Forest {
    build_forest_with(records, BuildOptions::default())
}

/// Build a forest with explicit options
pub fn build_forest_with(records: &[PersonRecord], options: BuildOptions) -> Forest {
    ForestBuilder::new(records).build(options)
}

/// Ids of every record reachable from `id` through parent links
///
/// Excludes `id` itself unless it sits on a cycle back to itself. Terminates on
/// cyclic input.
pub fn descendant_ids<'a>(records: &'a [PersonRecord], id: &str) -> HashSet<&'a str> {
    let mut children_of: HashMap<&str, Vec<&'a str>> = HashMap::new();
    for record in records {
        if let Some(parent) = record.parent_ref() {
            children_of.entry(parent).or_default().push(record.id.as_str());
        }
    }

    let mut found = HashSet::new();
    let mut stack: Vec<&str> = vec![id];
    while let Some(current) = stack.pop() {
        for &child in children_of.get(current).into_iter().flatten() {
            if found.insert(child) {
                stack.push(child);
            }
        }
    }
    found
}

struct ForestBuilder<'a> {
    records: &'a [PersonRecord],
    by_id: HashMap<&'a str, usize>,
    children_of: HashMap<&'a str, Vec<usize>>,
    visited: HashSet<&'a str>,
}

impl<'a> ForestBuilder<'a> {
    fn new(records: &'a [PersonRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut children_of: HashMap<&'a str, Vec<usize>> = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            by_id.entry(record.id.as_str()).or_insert(index);
            if let Some(parent) = record.parent_ref() {
                children_of.entry(parent).or_default().push(index);
            }
        }

        Self {
            records,
            by_id,
            children_of,
            visited: HashSet::with_capacity(records.len()),
        }
    }

    fn build(mut self, options: BuildOptions) -> Forest {
        let records = self.records;
        let mut roots = Vec::new();

        // Pass 1: declared roots
        for (index, record) in records.iter().enumerate() {
            if record.declares_root() && self.claim(index) {
                roots.extend(self.expand(index));
            }
        }
        let declared = roots.len();

        // Pass 2: orphans whose parent is not in the set
        for (index, record) in records.iter().enumerate() {
            let orphaned = record
                .parent_ref()
                .is_some_and(|parent| !self.by_id.contains_key(parent));
            if orphaned && self.claim(index) {
                roots.extend(self.expand(index));
            }
        }
        let orphans = roots.len() - declared;

        // Pass 3: cycle members nothing reached
        let mut excluded = Vec::new();
        for index in 0..records.len() {
            if !self.claim(index) {
                continue;
            }
            match options.cycle_policy {
                CyclePolicy::Exclude => excluded.push(records[index].id.clone()),
                CyclePolicy::PromoteAsRoot => {
                    tracing::debug!(
                        "Promoting {} to root to break a parent cycle",
                        records[index].id
                    );
                    roots.extend(self.expand(index));
                }
            }
        }

        if !excluded.is_empty() {
            tracing::warn!(
                "{} record(s) sit on parent cycles with no root and were left out: {:?}",
                excluded.len(),
                excluded
            );
        }

        tracing::debug!(
            "Built forest from {} records: {} declared roots, {} orphan roots, {} total roots",
            records.len(),
            declared,
            orphans,
            roots.len()
        );

        Forest { roots, excluded }
    }

    /// Mark the record's id visited; false if it was already placed
    fn claim(&mut self, index: usize) -> bool {
        self.visited.insert(self.records[index].id.as_str())
    }

    /// Expand an already-claimed record into its full subtree
    ///
    /// Depth-first with an explicit stack. Children are claimed the moment they are
    /// pushed, so a record can never be placed under two parents.
    fn expand(&mut self, root: usize) -> Option<TreeNode> {
        struct Frame<'s> {
            node: TreeNode,
            pending: std::slice::Iter<'s, usize>,
        }

        let records = self.records;
        let by_id = &self.by_id;
        let children_of = &self.children_of;
        let visited = &mut self.visited;

        let frame = |index: usize| {
            let member = &records[index];
            let spouse = member
                .spouse_ref()
                .and_then(|id| by_id.get(id))
                .map(|&spouse_index| records[spouse_index].clone());
            let pending = children_of
                .get(member.id.as_str())
                .map_or(&[][..], Vec::as_slice)
                .iter();
            Frame {
                node: TreeNode::new(member.clone(), spouse),
                pending,
            }
        };

        let mut stack = vec![frame(root)];
        let mut finished = None;

        while let Some(top) = stack.last_mut() {
            if let Some(&child) = top.pending.next() {
                if visited.insert(records[child].id.as_str()) {
                    stack.push(frame(child));
                }
                continue;
            }

            if let Some(done) = stack.pop() {
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(done.node),
                    None => finished = Some(done.node),
                }
            }
        }

        finished
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
