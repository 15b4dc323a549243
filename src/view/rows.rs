//! Flattening a filtered tree into render rows
//!
//! A row carries everything a renderer needs for one cast: nesting depth,
//! whether a connector line continues below it, and the resolved reply-parent
//! when the cast is a quote replying to a post outside its embeds.

use crate::resolve::ParentResolver;
use crate::thread::{CastNode, ConversationTree};
use serde::{Deserialize, Serialize};

/// One renderable cast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRow {
    /// The cast to render. Children are dropped (rows are already flat) and,
    /// when a reply-parent is surfaced, any embed pointing at that same
    /// parent is stripped so it is not rendered twice.
    pub node: CastNode,
    /// Nesting depth: 0 for the root, 1 for its direct replies
    pub depth: usize,
    /// Whether a connector line should continue below this row: the cast has
    /// children, further siblings, or an ancestor with further siblings
    pub connector_below: bool,
    /// Resolved reply-parent for "replying to X" context, kept distinct from
    /// whatever the cast quotes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_parent: Option<CastNode>,
}

/// Flatten the root plus a visible reply forest into render rows.
///
/// `visible` is the (possibly filtered) forest to render; the full tree is
/// still consulted for parent lookups so filtering never hides context.
pub fn assemble(
    tree: &ConversationTree,
    visible: &[CastNode],
    resolver: &ParentResolver,
) -> Vec<ThreadRow> {
    let mut rows = Vec::new();
    rows.push(make_row(&tree.root, tree, resolver, 0, !visible.is_empty()));
    walk(visible, tree, resolver, 1, false, &mut rows);
    rows
}

fn walk(
    nodes: &[CastNode],
    tree: &ConversationTree,
    resolver: &ParentResolver,
    depth: usize,
    ancestor_trailing: bool,
    rows: &mut Vec<ThreadRow>,
) {
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == nodes.len();
        let connector_below = !is_last || node.has_children() || ancestor_trailing;
        rows.push(make_row(node, tree, resolver, depth, connector_below));
        walk(
            node.child_nodes(),
            tree,
            resolver,
            depth + 1,
            !is_last || ancestor_trailing,
            rows,
        );
    }
}

fn make_row(
    node: &CastNode,
    tree: &ConversationTree,
    resolver: &ParentResolver,
    depth: usize,
    connector_below: bool,
) -> ThreadRow {
    let reply_parent = resolve_reply_parent(node, tree, resolver);
    let mut rendered = node.clone();
    rendered.children = None;
    if let Some(parent) = &reply_parent {
        rendered
            .embeds
            .retain(|embed| embed.cast_hash() != Some(&parent.hash));
    }
    ThreadRow {
        node: rendered,
        depth,
        connector_below,
        reply_parent,
    }
}

/// A quote cast gets "replying to" context when its reply-parent is a real
/// post other than the root and other than anything the cast itself quotes.
/// The parent may live in the tree or in the resolved-parent cache.
fn resolve_reply_parent(
    node: &CastNode,
    tree: &ConversationTree,
    resolver: &ParentResolver,
) -> Option<CastNode> {
    if !node.is_quote_cast() {
        return None;
    }
    let parent = node.parent_hash.as_ref()?;
    if *parent == tree.root.hash || node.quotes(parent) {
        return None;
    }
    tree.find(parent)
        .cloned()
        .or_else(|| resolver.get(parent))
}
