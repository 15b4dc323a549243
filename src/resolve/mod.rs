//! Parent resolution for quote casts
//!
//! A quote cast can reply to a post that was never fetched into the tree.
//! `ParentResolver` caches such parents once fetched and guarantees at most
//! one outstanding fetch per hash, even when back-to-back resolution passes
//! see the same gap before any fetch lands.

use crate::thread::{CastHash, CastNode, ConversationTree};
use dashmap::{DashMap, DashSet};

/// Per-view cache of resolved parent casts plus the in-flight fetch set.
///
/// Owned by exactly one conversation view; entries live for the view's
/// lifetime and are never re-fetched once resolved.
#[derive(Debug, Default)]
pub struct ParentResolver {
    resolved: DashMap<CastHash, CastNode>,
    in_flight: DashSet<CastHash>,
}

impl ParentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a hash for fetching. Returns true when the caller should issue
    /// the fetch: the hash is neither resolved nor already in flight.
    ///
    /// The check-and-insert is a single atomic step (`DashSet::insert`), so
    /// two passes racing on the same hash yield exactly one claim.
    pub fn begin(&self, hash: &CastHash) -> bool {
        if self.resolved.contains_key(hash) {
            return false;
        }
        self.in_flight.insert(hash.clone())
    }

    /// Record a successful fetch
    pub fn complete(&self, hash: CastHash, node: CastNode) {
        self.resolved.insert(hash.clone(), node);
        self.in_flight.remove(&hash);
    }

    /// Release a failed fetch. The hash becomes eligible again only when a
    /// later resolution pass claims it; there is no timer-based retry.
    pub fn fail(&self, hash: &CastHash) {
        self.in_flight.remove(hash);
    }

    /// Look up a resolved parent
    pub fn get(&self, hash: &CastHash) -> Option<CastNode> {
        self.resolved.get(hash).map(|entry| entry.clone())
    }

    pub fn is_resolved(&self, hash: &CastHash) -> bool {
        self.resolved.contains_key(hash)
    }

    pub fn is_in_flight(&self, hash: &CastHash) -> bool {
        self.in_flight.contains(hash)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// Snapshot of all resolved parent casts
    pub fn resolved_nodes(&self) -> Vec<CastNode> {
        self.resolved.iter().map(|entry| entry.clone()).collect()
    }
}

/// Collect the parent hashes one resolution pass should fetch.
///
/// A quote node's reply-parent qualifies when it is (a) not the root,
/// (b) absent from the tree, (c) distinct from every post that node quotes,
/// and (d) not already resolved. Previously-resolved parents are scanned
/// too, so deeper gaps close incrementally — but only one level per pass:
/// candidates claimed now are not themselves scanned until the next pass.
pub fn missing_parent_candidates(
    tree: &ConversationTree,
    resolver: &ParentResolver,
) -> Vec<CastHash> {
    let mut candidates = Vec::new();
    let mut consider = |node: &CastNode| {
        if !node.is_quote_cast() {
            return;
        }
        let Some(parent) = &node.parent_hash else {
            return;
        };
        if *parent == tree.root.hash
            || node.quotes(parent)
            || tree.contains(parent)
            || resolver.is_resolved(parent)
        {
            return;
        }
        if !candidates.contains(parent) {
            candidates.push(parent.clone());
        }
    };
    tree.for_each(&mut consider);
    for node in resolver.resolved_nodes() {
        consider(&node);
    }
    candidates
}
