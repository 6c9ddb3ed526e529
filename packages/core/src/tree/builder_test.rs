//! Tests for forest construction
//!
//! Covers root selection, orphan promotion, spouse resolution, ordering,
//! idempotence and parent cycles.

use super::*;
use crate::test_support::person;
use proptest::prelude::*;
use std::collections::HashMap;

fn child_ids(node: &TreeNode) -> Vec<&str> {
    node.children.iter().map(TreeNode::id).collect()
}

/// Every input id appears exactly once as a member, unless reported excluded
fn assert_placed_once(records: &[PersonRecord], forest: &Forest) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for node in forest.iter() {
        *seen.entry(node.id()).or_default() += 1;
    }

    for record in records {
        let placed = seen.get(record.id.as_str()).copied().unwrap_or(0);
        let excluded = forest.excluded.contains(&record.id);
        assert!(
            (placed == 1 && !excluded) || (placed == 0 && excluded),
            "record {} placed {} times (excluded: {})",
            record.id,
            placed,
            excluded
        );
    }
}

/// Children sit under the node whose id equals their parent id
fn assert_parent_links(forest: &Forest) {
    for node in forest.iter() {
        for child in &node.children {
            assert_eq!(child.member.parent_ref(), Some(node.id()));
        }
    }
}

#[test]
fn test_parent_with_two_children_in_input_order() {
    let records = vec![
        person("1", None, None),
        person("2", Some("1"), None),
        person("3", Some("1"), None),
    ];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["1"]);
    assert_eq!(child_ids(&forest.roots[0]), vec!["2", "3"]);
    assert!(forest.excluded.is_empty());
    assert_placed_once(&records, &forest);
}

#[test]
fn test_orphan_is_promoted_to_root() {
    let records = vec![person("1", Some("missing"), None)];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["1"]);
    assert!(forest.roots[0].children.is_empty());
}

#[test]
fn test_mutual_spouses_are_both_roots() {
    let records = vec![person("1", None, Some("2")), person("2", None, Some("1"))];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["1", "2"]);
    assert_eq!(forest.roots[0].spouse.as_ref().map(|s| s.id.as_str()), Some("2"));
    assert_eq!(forest.roots[1].spouse.as_ref().map(|s| s.id.as_str()), Some("1"));
    assert!(forest.roots.iter().all(|root| root.children.is_empty()));
}

#[test]
fn test_empty_input_yields_empty_forest() {
    let forest = build_forest(&[]);

    assert!(forest.is_empty());
    assert_eq!(forest.member_count(), 0);
    assert!(forest.excluded.is_empty());
}

#[test]
fn test_pure_cycle_is_excluded_by_default() {
    let records = vec![person("1", Some("2"), None), person("2", Some("1"), None)];

    let forest = build_forest(&records);

    assert!(forest.is_empty());
    assert_eq!(forest.excluded, vec!["1".to_string(), "2".to_string()]);
    assert_placed_once(&records, &forest);
}

#[test]
fn test_pure_cycle_promoted_when_requested() {
    let records = vec![person("1", Some("2"), None), person("2", Some("1"), None)];
    let options = BuildOptions::default().with_cycle_policy(CyclePolicy::PromoteAsRoot);

    let forest = build_forest_with(&records, options);

    assert_eq!(forest.root_ids(), vec!["1"]);
    assert_eq!(child_ids(&forest.roots[0]), vec!["2"]);
    assert!(forest.roots[0].children[0].children.is_empty());
    assert!(forest.excluded.is_empty());
    assert_placed_once(&records, &forest);
}

#[test]
fn test_cycle_with_descendants_is_excluded_together() {
    let records = vec![
        person("root", None, None),
        person("a", Some("b"), None),
        person("b", Some("a"), None),
        person("c", Some("b"), None),
    ];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["root"]);
    assert_eq!(forest.excluded, vec!["a", "b", "c"]);
    assert_placed_once(&records, &forest);
}

#[test]
fn test_self_parent_is_a_one_record_cycle() {
    let records = vec![person("1", Some("1"), None)];

    let excluded = build_forest(&records);
    assert!(excluded.is_empty());
    assert_eq!(excluded.excluded, vec!["1"]);

    let promoted = build_forest_with(
        &records,
        BuildOptions::default().with_cycle_policy(CyclePolicy::PromoteAsRoot),
    );
    assert_eq!(promoted.root_ids(), vec!["1"]);
    assert!(promoted.roots[0].children.is_empty());
}

#[test]
fn test_dangling_spouse_is_absent() {
    let records = vec![person("1", None, Some("gone")), person("2", None, None)];

    let forest = build_forest(&records);

    assert!(forest.roots.iter().all(|root| root.spouse.is_none()));
}

#[test]
fn test_spouse_is_not_expanded_as_subtree() {
    // 2 is married to 1 and also a child of 3; it must only be placed under 3
    let records = vec![
        person("1", None, Some("2")),
        person("3", None, None),
        person("2", Some("3"), Some("1")),
        person("4", Some("2"), None),
    ];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["1", "3"]);
    assert!(forest.roots[0].children.is_empty());
    assert_eq!(forest.roots[0].spouse.as_ref().unwrap().id, "2");
    assert_eq!(child_ids(&forest.roots[1]), vec!["2"]);
    assert_eq!(child_ids(&forest.roots[1].children[0]), vec!["4"]);
    assert_placed_once(&records, &forest);
}

#[test]
fn test_declared_roots_come_before_orphans() {
    let records = vec![
        person("orphan", Some("deleted"), None),
        person("root-a", None, None),
        person("kid", Some("orphan"), None),
        person("root-b", None, None),
    ];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["root-a", "root-b", "orphan"]);
    assert_eq!(child_ids(&forest.roots[2]), vec!["kid"]);
}

#[test]
fn test_child_listed_before_parent_still_nests() {
    let records = vec![
        person("grandchild", Some("child"), None),
        person("child", Some("root"), None),
        person("root", None, None),
    ];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["root"]);
    let child = &forest.roots[0].children[0];
    assert_eq!(child.id(), "child");
    assert_eq!(child_ids(child), vec!["grandchild"]);
    assert_parent_links(&forest);
}

#[test]
fn test_duplicate_ids_are_placed_once() {
    let mut duplicate = person("1", None, None);
    duplicate.name = "Second copy".to_string();
    let records = vec![person("1", None, None), duplicate, person("2", Some("1"), None)];

    let forest = build_forest(&records);

    assert_eq!(forest.root_ids(), vec!["1"]);
    assert_eq!(forest.roots[0].member.name, "Person 1");
    assert_eq!(child_ids(&forest.roots[0]), vec!["2"]);
}

#[test]
fn test_building_twice_gives_identical_forests() {
    let records = vec![
        person("a", None, Some("b")),
        person("b", None, None),
        person("c", Some("a"), None),
        person("d", Some("a"), Some("e")),
        person("e", Some("nowhere"), None),
        person("f", Some("d"), None),
    ];

    assert_eq!(build_forest(&records), build_forest(&records));
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let depth = 50_000;
    let mut records = vec![person("0", None, None)];
    for i in 1..depth {
        let parent = (i - 1).to_string();
        records.push(person(&i.to_string(), Some(&parent), None));
    }

    let forest = build_forest(&records);

    assert_eq!(forest.len(), 1);
    assert_eq!(forest.member_count(), depth);

    // Unwind iteratively so dropping the chain does not recurse
    let mut next = forest.roots.into_iter().next();
    while let Some(mut node) = next {
        next = node.children.pop();
    }
}

/// Reference picks: none, an id nobody has, or an index that may fall one past the end
#[derive(Debug, Clone, Copy)]
enum Link {
    Absent,
    Ghost,
    Index(usize),
}

fn link_strategy() -> impl Strategy<Value = Link> {
    prop_oneof![
        Just(Link::Absent),
        Just(Link::Ghost),
        (0usize..32).prop_map(Link::Index),
    ]
}

fn record_set_strategy() -> impl Strategy<Value = Vec<PersonRecord>> {
    prop::collection::vec((link_strategy(), link_strategy()), 0..25).prop_map(|links| {
        let size = links.len();
        let resolve = |link: Link| match link {
            Link::Absent => None,
            Link::Ghost => Some("ghost".to_string()),
            Link::Index(i) => Some((i % (size + 1)).to_string()),
        };
        links
            .iter()
            .enumerate()
            .map(|(i, (parent, spouse))| {
                person(
                    &i.to_string(),
                    resolve(*parent).as_deref(),
                    resolve(*spouse).as_deref(),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_generated_record_sets_hold_invariants(records in record_set_strategy()) {
        for policy in [CyclePolicy::Exclude, CyclePolicy::PromoteAsRoot] {
            let forest =
                build_forest_with(&records, BuildOptions::default().with_cycle_policy(policy));

            assert_placed_once(&records, &forest);
            assert_parent_links(&forest);

            for record in &records {
                let parent_resolves = record
                    .parent_ref()
                    .is_some_and(|p| records.iter().any(|r| r.id == p));
                if !parent_resolves {
                    prop_assert!(forest.root_ids().contains(&record.id.as_str()));
                }
            }

            for node in forest.iter() {
                let expected = node
                    .member
                    .spouse_ref()
                    .and_then(|id| records.iter().find(|r| r.id == id));
                prop_assert_eq!(node.spouse.as_ref(), expected);
            }

            if policy == CyclePolicy::PromoteAsRoot {
                prop_assert!(forest.excluded.is_empty());
                prop_assert_eq!(forest.member_count(), records.len());
            }
        }
    }
}

#[test]
fn test_descendant_ids_follow_parent_links() {
    let records = vec![
        person("a", None, None),
        person("b", Some("a"), None),
        person("c", Some("b"), None),
        person("d", None, None),
    ];

    let below_a = descendant_ids(&records, "a");
    assert_eq!(below_a.len(), 2);
    assert!(below_a.contains("b") && below_a.contains("c"));
    assert!(descendant_ids(&records, "c").is_empty());
    assert!(descendant_ids(&records, "missing").is_empty());
}

#[test]
fn test_descendant_ids_terminate_on_cycles() {
    let records = vec![person("x", Some("y"), None), person("y", Some("x"), None)];

    let found = descendant_ids(&records, "x");
    assert!(found.contains("y"));
    assert!(found.contains("x"));
}
