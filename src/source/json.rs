//! Fixture-backed conversation source
//!
//! Serves a conversation from a JSON file. Used by the CLI and in tests;
//! stands where a protocol client would in a deployment.
//!
//! Fixture shape:
//!
//! ```json
//! {
//!   "root": { "hash": "0x...", ... },
//!   "replies": [ ... ],
//!   "posts": { "0x...": { ... } }
//! }
//! ```
//!
//! `posts` holds casts outside the tree, looked up during parent resolution.

use super::{ConversationSource, FetchedConversation, SortMode, SourceError, SourceResult};
use crate::thread::{CastHash, CastNode};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Fixture {
    root: CastNode,
    #[serde(default)]
    replies: Vec<CastNode>,
    #[serde(default)]
    posts: HashMap<CastHash, CastNode>,
}

/// A conversation source reading from a JSON fixture file
#[derive(Debug)]
pub struct JsonFileSource {
    root: CastNode,
    replies: Vec<CastNode>,
    posts: HashMap<CastHash, CastNode>,
}

impl JsonFileSource {
    /// Load a fixture from a file
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Load a fixture from a JSON string
    pub fn from_json(raw: &str) -> SourceResult<Self> {
        let fixture: Fixture = serde_json::from_str(raw)?;
        Ok(Self {
            root: fixture.root,
            replies: fixture.replies,
            posts: fixture.posts,
        })
    }

    /// Hash of the fixture's root cast
    pub fn root_hash(&self) -> &CastHash {
        &self.root.hash
    }

    fn sort_forest(replies: &mut [CastNode], sort: SortMode) {
        match sort {
            SortMode::Newest => {
                replies.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            }
            SortMode::MostEngagement => {
                replies.sort_by(|a, b| b.counts.score().cmp(&a.counts.score()));
            }
            // Quality: engagement first, recency as tie-break
            SortMode::Quality => {
                replies.sort_by(|a, b| {
                    b.counts
                        .score()
                        .cmp(&a.counts.score())
                        .then_with(|| b.timestamp.cmp(&a.timestamp))
                });
            }
        }
    }
}

#[async_trait]
impl ConversationSource for JsonFileSource {
    async fn fetch_conversation(
        &self,
        root: &CastHash,
        sort: SortMode,
    ) -> SourceResult<FetchedConversation> {
        if self.root.hash != *root {
            return Err(SourceError::NotFound(root.to_string()));
        }
        let mut replies = self.replies.clone();
        Self::sort_forest(&mut replies, sort);
        Ok(FetchedConversation {
            root: self.root.clone(),
            replies,
            fetched_at: Utc::now(),
        })
    }

    async fn fetch_post(&self, hash: &CastHash) -> SourceResult<Option<CastNode>> {
        if self.root.hash == *hash {
            return Ok(Some(self.root.clone()));
        }
        Ok(self.posts.get(hash).cloned())
    }

    async fn persist_resolved_parent(
        &self,
        parent: &CastNode,
        root: &CastHash,
    ) -> SourceResult<()> {
        // Fixtures have nowhere to write; acknowledge so callers exercise
        // the same fire-and-forget path as against a live source.
        tracing::debug!(parent = %parent.hash, root = %root, "fixture source: skipping persist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::Author;
    use chrono::TimeZone;

    fn fixture_json() -> String {
        serde_json::json!({
            "root": { "hash": "0xroot", "author": { "fid": 1 }, "text": "gm" },
            "replies": [
                {
                    "hash": "0xa", "author": { "fid": 2 }, "text": "old and loved",
                    "timestamp": "2024-01-01T00:00:00Z",
                    "counts": { "likes": { "count": 5 } }
                },
                {
                    "hash": "0xb", "author": { "fid": 3 }, "text": "new and quiet",
                    "timestamp": "2024-06-01T00:00:00Z"
                }
            ],
            "posts": {
                "0xoutside": { "hash": "0xOUTSIDE", "author": { "fid": 9 }, "text": "elsewhere" }
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_fetch_conversation_sorts_newest_first() {
        let source = JsonFileSource::from_json(&fixture_json()).unwrap();
        let fetched = source
            .fetch_conversation(&CastHash::new("0xroot"), SortMode::Newest)
            .await
            .unwrap();
        assert_eq!(fetched.replies[0].hash.as_str(), "0xb");
    }

    #[tokio::test]
    async fn test_fetch_conversation_sorts_by_engagement() {
        let source = JsonFileSource::from_json(&fixture_json()).unwrap();
        let fetched = source
            .fetch_conversation(&CastHash::new("0xroot"), SortMode::MostEngagement)
            .await
            .unwrap();
        assert_eq!(fetched.replies[0].hash.as_str(), "0xa");
    }

    #[tokio::test]
    async fn test_fetch_unknown_root_fails() {
        let source = JsonFileSource::from_json(&fixture_json()).unwrap();
        let result = source
            .fetch_conversation(&CastHash::new("0xnope"), SortMode::Newest)
            .await;
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_post_from_posts_map() {
        let source = JsonFileSource::from_json(&fixture_json()).unwrap();
        let post = source
            .fetch_post(&CastHash::new("0xOutside"))
            .await
            .unwrap();
        assert_eq!(post.unwrap().author.fid.unwrap().value(), 9);
    }

    #[tokio::test]
    async fn test_fetch_post_missing_is_none() {
        let source = JsonFileSource::from_json(&fixture_json()).unwrap();
        let post = source.fetch_post(&CastHash::new("0xmissing")).await.unwrap();
        assert!(post.is_none());
    }

    #[tokio::test]
    async fn test_open_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convo.json");
        std::fs::write(&path, fixture_json()).unwrap();

        let source = JsonFileSource::open(&path).unwrap();
        assert_eq!(source.root_hash().as_str(), "0xroot");
    }

    #[test]
    fn test_quality_breaks_engagement_ties_by_recency() {
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut replies = vec![
            CastNode::new("0xold", Author::new(1))
                .with_likes(2)
                .with_timestamp(older),
            CastNode::new("0xnew", Author::new(2))
                .with_likes(2)
                .with_timestamp(newer),
        ];
        JsonFileSource::sort_forest(&mut replies, SortMode::Quality);
        assert_eq!(replies[0].hash.as_str(), "0xnew");
    }
}
