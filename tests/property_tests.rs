//! Property-based tests for keys and tree conversion.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::BTreeMap;

use proptest::prelude::*;

use irmin_client::core::types::BranchName;
use irmin_client::{flatten, unflatten, Contents, FlatEntry, PathKey, TreeNode};

/// Strategy for a single non-empty key segment.
fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_.-]{1,8}"
}

/// Strategy for raw key strings with stray separators, paired with the
/// parts they were built from (empty parts included).
fn messy_key_with_parts() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        prop::collection::vec(prop_oneof![segment(), Just(String::new())], 0..6),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(parts, lead, trail)| {
            let raw = format!(
                "{}{}{}",
                if lead { "/" } else { "" },
                parts.join("/"),
                if trail { "/" } else { "" }
            );
            (raw, parts)
        })
}

/// Strategy for raw key strings with stray separators.
fn messy_key() -> impl Strategy<Value = String> {
    messy_key_with_parts().prop_map(|(raw, _)| raw)
}

/// Canonical rendering of `parts`: non-empty parts joined by `/`, or the
/// root token.
fn expected_rendering(parts: &[String]) -> String {
    let kept: Vec<&str> = parts
        .iter()
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .collect();
    if kept.is_empty() {
        "/".to_string()
    } else {
        kept.join("/")
    }
}

/// Strategy for nested trees whose leaves are never at the root.
fn tree() -> impl Strategy<Value = TreeNode> {
    let leaf = ("[a-z]{0,6}", prop::option::of("[A-Z][a-z]{0,4}")).prop_map(|(v, m)| {
        TreeNode::Leaf(Contents {
            value: v,
            metadata: m,
        })
    });
    let node = leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::btree_map(segment(), inner, 1..4).prop_map(TreeNode::Directory)
    });
    prop::collection::btree_map(segment(), node, 0..4).prop_map(TreeNode::Directory)
}

fn strip_empty_dirs(node: &TreeNode) -> Option<TreeNode> {
    match node {
        TreeNode::Leaf(_) => Some(node.clone()),
        TreeNode::Directory(children) => {
            let kept: BTreeMap<_, _> = children
                .iter()
                .filter_map(|(k, v)| strip_empty_dirs(v).map(|v| (k.clone(), v)))
                .collect();
            (!kept.is_empty()).then_some(TreeNode::Directory(kept))
        }
    }
}

proptest! {
    #[test]
    fn rendered_key_has_no_stray_separators(raw in messy_key()) {
        let rendered = PathKey::parse(&raw).render();
        if rendered != "/" {
            prop_assert!(!rendered.starts_with('/'));
            prop_assert!(!rendered.ends_with('/'));
            prop_assert!(!rendered.contains("//"));
        }
    }

    #[test]
    fn rendering_keeps_every_non_empty_part((raw, parts) in messy_key_with_parts()) {
        let key = PathKey::parse(&raw);
        prop_assert_eq!(key.render(), expected_rendering(&parts));
        prop_assert_eq!(key.len(), parts.iter().filter(|p| !p.is_empty()).count());
    }

    #[test]
    fn key_normalization_is_idempotent(raw in messy_key()) {
        let once = PathKey::parse(&raw).render();
        let twice = PathKey::parse(&once).render();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn key_segments_survive_rendering(parts in prop::collection::vec(segment(), 0..6)) {
        let key = PathKey::from_segments(parts.clone());
        prop_assert_eq!(key.segments(), parts.as_slice());
        prop_assert_eq!(PathKey::parse(&key.render()), key);
    }

    #[test]
    fn leading_slash_is_irrelevant(raw in messy_key()) {
        let with = PathKey::parse(&format!("/{}", raw));
        let without = PathKey::parse(&raw);
        prop_assert_eq!(with, without);
    }

    #[test]
    fn flatten_then_unflatten_recovers_tree(t in tree()) {
        let entries = flatten(&t).unwrap();
        let rebuilt = unflatten(entries).unwrap();
        let expected = strip_empty_dirs(&t).unwrap_or_default();
        prop_assert_eq!(rebuilt, expected);
    }

    #[test]
    fn flatten_yields_one_entry_per_leaf(t in tree()) {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf(_) => 1,
                TreeNode::Directory(c) => c.values().map(leaves).sum(),
            }
        }
        let entries = flatten(&t).unwrap();
        prop_assert_eq!(entries.len(), leaves(&t));
        for FlatEntry { key, .. } in &entries {
            prop_assert!(!key.starts_with('/'));
            prop_assert!(key != "/");
        }
    }

    #[test]
    fn valid_branch_names_roundtrip(name in "[a-zA-Z0-9][a-zA-Z0-9_./-]{0,30}") {
        let branch = BranchName::new(&name).unwrap();
        let json = serde_json::to_string(&branch).unwrap();
        let parsed: BranchName = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(branch.as_str(), name.as_str());
        prop_assert_eq!(parsed, branch);
    }
}

#[test]
fn messy_keys_render_canonically() {
    let cases = [
        ("/a/b/", "a/b"),
        ("a//b", "a/b"),
        ("//", "/"),
        ("", "/"),
        ("x", "x"),
        ("/x//y/z//", "x/y/z"),
    ];
    for (raw, expected) in cases {
        assert_eq!(PathKey::parse(raw).render(), expected, "{raw:?}");
    }
}
