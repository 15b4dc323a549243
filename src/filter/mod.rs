//! Engagement-based filtering of a reply forest
//!
//! The filter is a derived, non-destructive projection: it clones surviving
//! nodes and never mutates the source tree. Recomputing it on every render is
//! cheap and keeps the view pure.

use crate::thread::{count_forest, CastNode};
use serde::{Deserialize, Serialize};

/// What the filter keeps visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Show every reply
    #[default]
    KeepAll,
    /// Hide subtrees with no engagement anywhere in them
    HideNoEngagement,
}

/// The visible subset of a forest, plus how many nodes were hidden
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterView {
    pub visible: Vec<CastNode>,
    pub hidden_count: usize,
}

/// Apply a filter mode to a reply forest.
///
/// The walk is post-order: children are filtered first, and a node with any
/// surviving child is retained regardless of its own engagement, so an
/// ancestor of a visible descendant is never hidden. The hidden count is
/// recomputed from whole-tree totals rather than tracked incrementally.
pub fn apply(forest: &[CastNode], mode: FilterMode) -> FilterView {
    let visible = filter_forest(forest, mode);
    let hidden_count = count_forest(forest) - count_forest(&visible);
    FilterView {
        visible,
        hidden_count,
    }
}

fn filter_forest(nodes: &[CastNode], mode: FilterMode) -> Vec<CastNode> {
    nodes
        .iter()
        .filter_map(|node| filter_node(node, mode))
        .collect()
}

fn filter_node(node: &CastNode, mode: FilterMode) -> Option<CastNode> {
    let surviving = filter_forest(node.child_nodes(), mode);

    if mode == FilterMode::HideNoEngagement && !node.has_engagement() && surviving.is_empty() {
        return None;
    }

    let mut kept = node.clone();
    // An empty surviving list is dropped entirely rather than kept as [].
    kept.children = if surviving.is_empty() {
        None
    } else {
        Some(surviving)
    };
    Some(kept)
}
