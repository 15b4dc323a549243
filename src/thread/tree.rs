//! ConversationTree: a root cast plus its fetched reply forest

use super::node::{CastHash, CastNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One fetched conversation: a root cast and an ordered forest of replies,
/// nested to unbounded depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTree {
    pub root: CastNode,
    pub replies: Vec<CastNode>,
    pub fetched_at: DateTime<Utc>,
}

impl ConversationTree {
    /// Assemble a tree from fetched parts.
    ///
    /// Duplicate hashes within one tree are a data-integrity fault in the
    /// source. They are flagged here, never silently resolved — search still
    /// returns the first match in depth-first order.
    pub fn new(root: CastNode, replies: Vec<CastNode>, fetched_at: DateTime<Utc>) -> Self {
        let tree = Self {
            root,
            replies,
            fetched_at,
        };
        let duplicates = tree.duplicate_hashes();
        if !duplicates.is_empty() {
            tracing::warn!(
                root = %tree.root.hash,
                count = duplicates.len(),
                "duplicate cast hashes in fetched tree"
            );
        }
        tree
    }

    /// Find a cast by hash anywhere in the tree, root included.
    ///
    /// Hashes are normalized at construction, so lookup is case-insensitive
    /// regardless of how the query hash was written.
    pub fn find(&self, hash: &CastHash) -> Option<&CastNode> {
        if self.root.hash == *hash {
            return Some(&self.root);
        }
        find_in_forest(&self.replies, hash)
    }

    pub fn contains(&self, hash: &CastHash) -> bool {
        self.find(hash).is_some()
    }

    /// Total number of casts in the tree, root included
    pub fn node_count(&self) -> usize {
        1 + count_forest(&self.replies)
    }

    /// Hashes appearing more than once in the tree
    pub fn duplicate_hashes(&self) -> Vec<CastHash> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        let mut visit = |node: &CastNode| {
            if !seen.insert(node.hash.clone()) && !duplicates.contains(&node.hash) {
                duplicates.push(node.hash.clone());
            }
        };
        visit(&self.root);
        for_each_node(&self.replies, &mut visit);
        duplicates
    }

    /// Visit every cast in the tree, root first, depth-first
    pub fn for_each(&self, f: &mut impl FnMut(&CastNode)) {
        f(&self.root);
        for_each_node(&self.replies, f);
    }
}

/// Depth-first search over a forest for a target hash, first match wins
pub fn find_in_forest<'a>(nodes: &'a [CastNode], hash: &CastHash) -> Option<&'a CastNode> {
    for node in nodes {
        if node.hash == *hash {
            return Some(node);
        }
        if let Some(found) = find_in_forest(node.child_nodes(), hash) {
            return Some(found);
        }
    }
    None
}

/// Count every node in a forest, including all descendants
pub fn count_forest(nodes: &[CastNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_forest(node.child_nodes()))
        .sum()
}

fn for_each_node(nodes: &[CastNode], f: &mut impl FnMut(&CastNode)) {
    for node in nodes {
        f(node);
        for_each_node(node.child_nodes(), f);
    }
}
