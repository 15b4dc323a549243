//! Conversation view orchestration
//!
//! `ConversationView` is the single entry point consumers render from. It
//! owns the fetched tree, the filter/sort state, the per-view parent
//! resolver, and the focus controller; renderers pull an immutable
//! `ViewSnapshot` and subscribe to a render tick instead of listening for
//! ambient global events.

mod focus;
mod rows;

pub use focus::{FocusController, FocusState, ScrollCommand, HEADER_OFFSET_PX, HIGHLIGHT_DURATION};
pub use rows::{assemble, ThreadRow};

use crate::filter::{self, FilterMode};
use crate::resolve::{missing_parent_candidates, ParentResolver};
use crate::source::{ConversationSource, SortMode};
use crate::thread::{CastHash, ConversationTree, Fid};
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Callback invoked after a successful load that returned zero replies,
/// letting the caller prompt starting the conversation
pub type EmptyCallback = Box<dyn Fn() + Send + Sync>;

/// Construction options for a conversation view
pub struct ViewOptions {
    pub root: CastHash,
    pub viewer: Option<Fid>,
    pub focus_target: Option<CastHash>,
    pub sort: SortMode,
    pub filter: FilterMode,
    pub on_empty: Option<EmptyCallback>,
}

impl ViewOptions {
    pub fn new(root: impl Into<CastHash>) -> Self {
        Self {
            root: root.into(),
            viewer: None,
            focus_target: None,
            sort: SortMode::default(),
            filter: FilterMode::default(),
            on_empty: None,
        }
    }

    pub fn with_viewer(mut self, viewer: Fid) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn with_focus_target(mut self, target: impl Into<CastHash>) -> Self {
        self.focus_target = Some(target.into());
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    pub fn on_empty(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_empty = Some(Box::new(callback));
        self
    }
}

/// Lifecycle state of the view's tree fetch
#[derive(Debug, Clone)]
pub enum ViewState {
    Loading,
    Ready(ConversationTree),
    Failed(String),
}

/// Pure render projection, recomputed from current state on every call
#[derive(Debug, Clone)]
pub enum ViewSnapshot {
    Loading,
    Failed {
        message: String,
    },
    Ready {
        rows: Vec<ThreadRow>,
        hidden_count: usize,
        fetched_at: DateTime<Utc>,
        highlighted: Option<CastHash>,
    },
}

/// A conversation anchored at one root cast.
///
/// All mutable state belongs exclusively to this instance; nothing is shared
/// across views or persisted beyond the view's lifetime. Spawned fetch tasks
/// hold only `Weak` references back, so completions after teardown are
/// ignored rather than crashing.
pub struct ConversationView {
    source: Arc<dyn ConversationSource>,
    root: CastHash,
    viewer: Option<Fid>,
    focus_target: Option<CastHash>,
    state: RwLock<ViewState>,
    sort: RwLock<SortMode>,
    filter: RwLock<FilterMode>,
    resolver: Arc<ParentResolver>,
    focus: Arc<FocusController>,
    on_empty: Option<EmptyCallback>,
    tick: watch::Sender<u64>,
}

impl ConversationView {
    pub fn new(source: Arc<dyn ConversationSource>, options: ViewOptions) -> Arc<Self> {
        let (tick, _) = watch::channel(0);
        Arc::new(Self {
            source,
            root: options.root,
            viewer: options.viewer,
            focus_target: options.focus_target,
            state: RwLock::new(ViewState::Loading),
            sort: RwLock::new(options.sort),
            filter: RwLock::new(options.filter),
            resolver: Arc::new(ParentResolver::new()),
            focus: Arc::new(FocusController::new()),
            on_empty: options.on_empty,
            tick,
        })
    }

    pub fn root(&self) -> &CastHash {
        &self.root
    }

    pub fn viewer(&self) -> Option<Fid> {
        self.viewer
    }

    pub fn sort(&self) -> SortMode {
        *read(&self.sort)
    }

    pub fn filter(&self) -> FilterMode {
        *read(&self.filter)
    }

    pub fn state(&self) -> ViewState {
        read(&self.state).clone()
    }

    /// Observe render ticks. The channel is scoped to this view; each state
    /// change or parent resolution bumps it once.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tick.subscribe()
    }

    /// Fetch the conversation tree from the source.
    ///
    /// Only this fetch surfaces failure (as `ViewState::Failed`); everything
    /// downstream degrades to missing context instead.
    pub async fn load(self: &Arc<Self>) {
        *write(&self.state) = ViewState::Loading;
        self.bump();

        let sort = self.sort();
        tracing::debug!(root = %self.root, ?sort, "fetching conversation");

        match self.source.fetch_conversation(&self.root, sort).await {
            Ok(fetched) => {
                let tree = ConversationTree::new(fetched.root, fetched.replies, fetched.fetched_at);
                let is_empty = tree.replies.is_empty();
                *write(&self.state) = ViewState::Ready(tree);
                self.bump();

                if is_empty {
                    if let Some(callback) = &self.on_empty {
                        callback();
                    }
                }

                self.run_resolution_pass();

                if let Some(target) = self.focus_target.clone() {
                    let _ = self.focus_reply(&target);
                }
            }
            Err(e) => {
                tracing::error!(root = %self.root, error = %e, "conversation fetch failed");
                *write(&self.state) = ViewState::Failed(e.to_string());
                self.bump();
            }
        }
    }

    /// Re-fetch under the current sort mode
    pub async fn refresh(self: &Arc<Self>) {
        self.load().await;
    }

    /// Switch sort mode. Ordering comes from the source, so this re-fetches
    /// rather than re-sorting locally.
    pub async fn set_sort(self: &Arc<Self>, sort: SortMode) {
        *write(&self.sort) = sort;
        self.load().await;
    }

    /// Switch filter mode. The visible projection is derived, so no fetch is
    /// needed; the next snapshot reflects it.
    pub fn set_filter(&self, mode: FilterMode) {
        *write(&self.filter) = mode;
        self.bump();
    }

    /// Compute the current render projection
    pub fn snapshot(&self) -> ViewSnapshot {
        match &*read(&self.state) {
            ViewState::Loading => ViewSnapshot::Loading,
            ViewState::Failed(message) => ViewSnapshot::Failed {
                message: message.clone(),
            },
            ViewState::Ready(tree) => {
                let view = filter::apply(&tree.replies, self.filter());
                let rows = rows::assemble(tree, &view.visible, &self.resolver);
                ViewSnapshot::Ready {
                    rows,
                    hidden_count: view.hidden_count,
                    fetched_at: tree.fetched_at,
                    highlighted: self.focus.highlighted(),
                }
            }
        }
    }

    /// Scroll to and highlight a reply. No-op when the target is not in the
    /// current tree; re-triggering after data changes is the caller's job.
    pub fn focus_reply(self: &Arc<Self>, target: &CastHash) -> Option<ScrollCommand> {
        let state = read(&self.state);
        let ViewState::Ready(tree) = &*state else {
            return None;
        };
        let command = self.focus.focus(target, tree)?;
        drop(state);
        self.bump();
        Some(command)
    }

    /// Issue fetches for quote parents missing from the tree.
    ///
    /// One level per pass: parents resolved now widen the search space the
    /// next pass works against. Runs automatically after each load; callers
    /// may re-run it when the tree or filter changes.
    pub fn run_resolution_pass(self: &Arc<Self>) {
        let candidates = {
            let state = read(&self.state);
            let ViewState::Ready(tree) = &*state else {
                return;
            };
            missing_parent_candidates(tree, &self.resolver)
        };

        for hash in candidates {
            if !self.resolver.begin(&hash) {
                continue;
            }
            tracing::debug!(parent = %hash, "resolving quote parent");

            let source = Arc::clone(&self.source);
            let resolver = Arc::clone(&self.resolver);
            let root = self.root.clone();
            let view = Arc::downgrade(self);

            tokio::spawn(async move {
                match source.fetch_post(&hash).await {
                    Ok(Some(post)) => {
                        resolver.complete(hash.clone(), post.clone());

                        // Fire-and-forget: persistence failure is logged and
                        // never touches in-memory resolution.
                        let persist_source = Arc::clone(&source);
                        let persist_root = root.clone();
                        tokio::spawn(async move {
                            if let Err(e) = persist_source
                                .persist_resolved_parent(&post, &persist_root)
                                .await
                            {
                                tracing::warn!(
                                    parent = %post.hash,
                                    error = %e,
                                    "failed to persist resolved parent"
                                );
                            }
                        });

                        if let Some(view) = view.upgrade() {
                            view.bump();
                        }
                    }
                    Ok(None) => {
                        resolver.fail(&hash);
                        tracing::warn!(parent = %hash, "quote parent not found upstream");
                    }
                    Err(e) => {
                        resolver.fail(&hash);
                        tracing::warn!(parent = %hash, error = %e, "quote parent fetch failed");
                    }
                }
            });
        }
    }

    /// The per-view parent cache (exposed for renderers and tests)
    pub fn resolver(&self) -> &ParentResolver {
        &self.resolver
    }

    fn bump(&self) {
        self.tick.send_modify(|n| *n += 1);
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
