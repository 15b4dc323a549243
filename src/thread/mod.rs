//! Core conversation data structures

mod node;
mod tree;

pub use node::{Author, CastHash, CastNode, Embed, EngagementCounts, Fid, ReactionTally};
pub use tree::{count_forest, find_in_forest, ConversationTree};
