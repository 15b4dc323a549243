//! Threadline: Conversation Thread Engine
//!
//! Assembles, filters, and renders threaded conversations (a root cast plus
//! nested reply trees) fetched from a decentralized social-graph protocol.
//!
//! # Core Concepts
//!
//! - **ConversationTree**: one root cast plus an ordered forest of replies
//! - **Quote**: a cast replying to one post while embedding a reference to a
//!   (possibly different) post; missing reply-parents are resolved lazily
//! - **FilterView**: a derived, non-mutating visible subset of the tree
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use threadline::{ConversationView, JsonFileSource, ViewOptions};
//!
//! # async fn demo() -> Result<(), threadline::SourceError> {
//! let source = Arc::new(JsonFileSource::open("conversation.json")?);
//! let view = ConversationView::new(
//!     source.clone(),
//!     ViewOptions::new(source.root_hash().clone()),
//! );
//! view.load().await;
//! let snapshot = view.snapshot();
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod resolve;
pub mod source;
mod thread;
pub mod view;

pub use filter::{FilterMode, FilterView};
pub use resolve::ParentResolver;
pub use source::{
    ConversationSource, FetchedConversation, JsonFileSource, SortMode, SourceError, SourceResult,
};
pub use thread::{
    Author, CastHash, CastNode, ConversationTree, Embed, EngagementCounts, Fid, ReactionTally,
};
pub use view::{
    ConversationView, FocusState, ScrollCommand, ThreadRow, ViewOptions, ViewSnapshot, ViewState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
