//! Shared test fixtures: an instrumented in-memory conversation source

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use threadline::{
    Author, CastHash, CastNode, ConversationSource, Embed, FetchedConversation, SortMode,
    SourceError, SourceResult,
};

/// In-memory source that counts every fetch and records every persist call
#[derive(Default)]
pub struct MockSource {
    pub root: Mutex<Option<CastNode>>,
    pub replies: Mutex<Vec<CastNode>>,
    pub posts: DashMap<CastHash, CastNode>,
    pub fail_conversation: AtomicBool,
    pub post_fetches: DashMap<CastHash, u64>,
    pub persisted: Mutex<Vec<(CastHash, CastHash)>>,
}

impl MockSource {
    pub fn new(root: CastNode, replies: Vec<CastNode>) -> Self {
        Self {
            root: Mutex::new(Some(root)),
            replies: Mutex::new(replies),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let source = Self::default();
        source.fail_conversation.store(true, Ordering::SeqCst);
        source
    }

    pub fn add_post(&self, post: CastNode) {
        self.posts.insert(post.hash.clone(), post);
    }

    pub fn fetches_for(&self, hash: &CastHash) -> u64 {
        self.post_fetches.get(hash).map(|n| *n).unwrap_or(0)
    }

    pub fn persisted_pairs(&self) -> Vec<(CastHash, CastHash)> {
        self.persisted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationSource for MockSource {
    async fn fetch_conversation(
        &self,
        root: &CastHash,
        _sort: SortMode,
    ) -> SourceResult<FetchedConversation> {
        if self.fail_conversation.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("hub timed out".into()));
        }
        let stored = self.root.lock().unwrap().clone();
        match stored {
            Some(node) if node.hash == *root => Ok(FetchedConversation {
                root: node,
                replies: self.replies.lock().unwrap().clone(),
                fetched_at: Utc::now(),
            }),
            _ => Err(SourceError::NotFound(root.to_string())),
        }
    }

    async fn fetch_post(&self, hash: &CastHash) -> SourceResult<Option<CastNode>> {
        *self.post_fetches.entry(hash.clone()).or_insert(0) += 1;
        Ok(self.posts.get(hash).map(|entry| entry.clone()))
    }

    async fn persist_resolved_parent(
        &self,
        parent: &CastNode,
        root: &CastHash,
    ) -> SourceResult<()> {
        self.persisted
            .lock()
            .unwrap()
            .push((parent.hash.clone(), root.clone()));
        Ok(())
    }
}

pub fn cast(hash: &str, fid: u64) -> CastNode {
    CastNode::new(hash, Author::new(fid))
}

pub fn quote(hash: &str, fid: u64, parent: &str, quoted: &str) -> CastNode {
    cast(hash, fid).with_parent(parent).with_embed(Embed::Cast {
        hash: CastHash::new(quoted),
        fid: None,
    })
}

/// Drive the current-thread runtime until spawned fetch tasks settle
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
