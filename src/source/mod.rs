//! Upstream data source definitions
//!
//! Protocol fetch and persistence live behind `ConversationSource`. The
//! engine never talks to the network directly; it asks the source for a
//! conversation tree, for single casts during parent resolution, and hands
//! resolved parents back for best-effort persistence.

mod json;

pub use json::JsonFileSource;

use crate::thread::{CastHash, CastNode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to an upstream source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Ordering requested from the upstream source.
///
/// The view re-fetches under a new mode rather than re-sorting locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Newest,
    MostEngagement,
    Quality,
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortMode::Newest),
            "engagement" | "most-engagement" => Ok(SortMode::MostEngagement),
            "quality" => Ok(SortMode::Quality),
            other => Err(format!(
                "unknown sort mode '{}' (expected newest, engagement, or quality)",
                other
            )),
        }
    }
}

/// A conversation as delivered by the source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedConversation {
    pub root: CastNode,
    pub replies: Vec<CastNode>,
    pub fetched_at: DateTime<Utc>,
}

/// Trait for upstream conversation sources
///
/// Implementations must be thread-safe (Send + Sync); fetches for different
/// casts may be outstanding simultaneously.
#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Fetch a conversation tree anchored at the given root, ordered per the
    /// sort mode
    async fn fetch_conversation(
        &self,
        root: &CastHash,
        sort: SortMode,
    ) -> SourceResult<FetchedConversation>;

    /// Fetch a single cast by hash (used for parent resolution)
    async fn fetch_post(&self, hash: &CastHash) -> SourceResult<Option<CastNode>>;

    /// Persist a resolved parent alongside its conversation. Best-effort:
    /// callers fire and forget, and failures never affect in-memory state.
    async fn persist_resolved_parent(
        &self,
        parent: &CastNode,
        root: &CastHash,
    ) -> SourceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("newest".parse::<SortMode>().unwrap(), SortMode::Newest);
        assert_eq!(
            "engagement".parse::<SortMode>().unwrap(),
            SortMode::MostEngagement
        );
        assert_eq!("quality".parse::<SortMode>().unwrap(), SortMode::Quality);
        assert!("top".parse::<SortMode>().is_err());
    }
}
