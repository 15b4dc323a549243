//! Cast representation: the unit of a conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a cast (a hex-encoded hash, e.g. "0x9f2c…")
///
/// Upstream sources deliver hashes in mixed case. The hash is normalized to
/// ASCII lowercase once here, at the data-model boundary, so every comparison
/// in the crate is case-insensitive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CastHash(String);

impl CastHash {
    /// Create a CastHash, normalizing to lowercase
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().to_ascii_lowercase())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CastHash {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for CastHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<CastHash> for String {
    fn from(hash: CastHash) -> Self {
        hash.0
    }
}

impl std::fmt::Display for CastHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Protocol-level user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fid(u64);

impl Fid {
    pub fn new(fid: u64) -> Self {
        Self(fid)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Fid {
    fn from(fid: u64) -> Self {
        Self(fid)
    }
}

impl std::fmt::Display for Fid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a cast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub fid: Option<Fid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
}

impl Author {
    pub fn new(fid: u64) -> Self {
        Self {
            fid: Some(Fid::new(fid)),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Best available handle for display ("@username", display name, or fid)
    pub fn handle(&self) -> String {
        if let Some(ref username) = self.username {
            format!("@{}", username)
        } else if let Some(ref display_name) = self.display_name {
            display_name.clone()
        } else if let Some(fid) = self.fid {
            format!("fid:{}", fid)
        } else {
            "unknown".to_string()
        }
    }
}

/// An embed entry attached to a cast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Embed {
    /// External URL
    Url { url: String },
    /// Reference to another cast by hash (a quote)
    Cast {
        hash: CastHash,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fid: Option<Fid>,
    },
}

impl Embed {
    /// The referenced cast hash, if this embed quotes another cast
    pub fn cast_hash(&self) -> Option<&CastHash> {
        match self {
            Embed::Cast { hash, .. } => Some(hash),
            Embed::Url { .. } => None,
        }
    }
}

/// Likes or recasts: an aggregate counter, a reactor list, or both.
///
/// When both representations are present the counter wins — reactor lists
/// are often truncated by the upstream source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionTally {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fids: Vec<Fid>,
}

impl ReactionTally {
    pub fn of(count: u64) -> Self {
        Self {
            count: Some(count),
            fids: Vec::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.fids.len() as u64)
    }
}

/// Interaction counters on a cast.
///
/// The reply count comes from the source counter only. The fetched children
/// list is partial by design and must not stand in for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementCounts {
    #[serde(default)]
    pub likes: ReactionTally,
    #[serde(default)]
    pub recasts: ReactionTally,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<u64>,
}

impl EngagementCounts {
    /// Combined interaction total, used for engagement-based ordering
    pub fn score(&self) -> u64 {
        self.likes.total() + self.recasts.total() + self.replies.unwrap_or(0)
    }
}

/// A cast in a conversation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastNode {
    /// Unique identifier within one fetched tree
    pub hash: CastHash,
    /// Hash of the cast this one replies to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_hash: Option<CastHash>,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub text: String,
    /// Raw embed list; cast embeds mark this node as a quote
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    /// Fetched direct replies. Absent means "not fetched", which renders
    /// differently from an explicitly empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CastNode>>,
    #[serde(default)]
    pub counts: EngagementCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Explicit quote flag from the source
    #[serde(default)]
    pub is_quote: bool,
}

impl CastNode {
    /// Create a new cast with the given hash and author
    pub fn new(hash: impl Into<CastHash>, author: Author) -> Self {
        Self {
            hash: hash.into(),
            parent_hash: None,
            author,
            text: String::new(),
            embeds: Vec::new(),
            children: None,
            counts: EngagementCounts::default(),
            timestamp: None,
            is_quote: false,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<CastHash>) -> Self {
        self.parent_hash = Some(parent.into());
        self
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn with_child(mut self, child: CastNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn with_likes(mut self, count: u64) -> Self {
        self.counts.likes = ReactionTally::of(count);
        self
    }

    pub fn with_recasts(mut self, count: u64) -> Self {
        self.counts.recasts = ReactionTally::of(count);
        self
    }

    pub fn with_reply_count(mut self, count: u64) -> Self {
        self.counts.replies = Some(count);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Whether this cast quotes another cast: flagged by the source, or
    /// carrying at least one cast embed
    pub fn is_quote_cast(&self) -> bool {
        self.is_quote || self.embeds.iter().any(|e| e.cast_hash().is_some())
    }

    /// Hashes of all casts quoted by this one
    pub fn quoted_hashes(&self) -> impl Iterator<Item = &CastHash> {
        self.embeds.iter().filter_map(Embed::cast_hash)
    }

    /// Whether the given hash is among this cast's quoted-post references.
    ///
    /// A quote's reply-parent and its quoted posts are distinct concepts even
    /// when their hashes collide; callers use this to tell them apart.
    pub fn quotes(&self, hash: &CastHash) -> bool {
        self.quoted_hashes().any(|h| h == hash)
    }

    /// Whether this cast has nonzero likes, recasts, or replies
    pub fn has_engagement(&self) -> bool {
        self.counts.score() > 0
    }

    /// Fetched children, if any were delivered
    pub fn child_nodes(&self) -> &[CastNode] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn has_children(&self) -> bool {
        !self.child_nodes().is_empty()
    }
}
