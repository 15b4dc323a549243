//! Scroll-to-reply focus targeting
//!
//! A two-state machine: Idle, or Highlighted on one target cast. Focusing a
//! target that exists in the rendered tree emits a scroll command and starts
//! a fixed un-highlight timer; a newer target preempts a pending timer via an
//! epoch counter. Timer completions after the controller is gone are dropped.

use crate::thread::{CastHash, ConversationTree};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Scroll offset compensating for the fixed header above the thread
pub const HEADER_OFFSET_PX: u32 = 64;

/// How long a focused cast stays highlighted
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// Current highlight state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    Highlighted(CastHash),
}

/// Instruction for the renderer: bring the target into view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollCommand {
    pub target: CastHash,
    pub header_offset_px: u32,
}

/// One-shot highlight controller for a conversation view
#[derive(Debug, Default)]
pub struct FocusController {
    state: Mutex<FocusState>,
    epoch: AtomicU64,
}

impl Default for FocusState {
    fn default() -> Self {
        FocusState::Idle
    }
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FocusState {
        self.lock_state().clone()
    }

    /// The currently highlighted cast, if any
    pub fn highlighted(&self) -> Option<CastHash> {
        match self.state() {
            FocusState::Highlighted(hash) => Some(hash),
            FocusState::Idle => None,
        }
    }

    /// Focus a target cast.
    ///
    /// No-op returning `None` when the target is absent from the tree;
    /// re-triggering after the tree changes is the caller's responsibility.
    /// Must be called within a tokio runtime (spawns the un-highlight timer).
    pub fn focus(
        self: &Arc<Self>,
        target: &CastHash,
        tree: &ConversationTree,
    ) -> Option<ScrollCommand> {
        tree.find(target)?;

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        *self.lock_state() = FocusState::Highlighted(target.clone());
        tracing::debug!(target = %target, "highlighting focused reply");

        let controller = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::time::sleep(HIGHLIGHT_DURATION).await;
            let Some(controller) = controller.upgrade() else {
                return;
            };
            // A newer focus bumped the epoch: its timer owns the reset.
            if controller.epoch.load(Ordering::SeqCst) == epoch {
                *controller.lock_state() = FocusState::Idle;
            }
        });

        Some(ScrollCommand {
            target: target.clone(),
            header_offset_px: HEADER_OFFSET_PX,
        })
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FocusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::{Author, CastNode};
    use chrono::Utc;

    fn tree_with(replies: Vec<CastNode>) -> ConversationTree {
        ConversationTree::new(
            CastNode::new("0xroot", Author::new(1)),
            replies,
            Utc::now(),
        )
    }

    fn reply(hash: &str) -> CastNode {
        CastNode::new(hash, Author::new(2))
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_highlights_then_returns_to_idle() {
        let controller = Arc::new(FocusController::new());
        let tree = tree_with(vec![reply("0xdef")]);

        let command = controller.focus(&CastHash::new("0xDEF"), &tree).unwrap();
        assert_eq!(command.target, CastHash::new("0xdef"));
        assert_eq!(command.header_offset_px, HEADER_OFFSET_PX);
        assert_eq!(
            controller.state(),
            FocusState::Highlighted(CastHash::new("0xdef"))
        );

        tokio::time::sleep(HIGHLIGHT_DURATION + Duration::from_millis(10)).await;
        assert_eq!(controller.state(), FocusState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_target_is_noop() {
        let controller = Arc::new(FocusController::new());
        let tree = tree_with(vec![reply("0xa")]);

        assert!(controller.focus(&CastHash::new("0xdef"), &tree).is_none());
        assert_eq!(controller.state(), FocusState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_target_preempts_pending_timer() {
        let controller = Arc::new(FocusController::new());
        let tree = tree_with(vec![reply("0xa"), reply("0xb")]);

        controller.focus(&CastHash::new("0xa"), &tree).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.focus(&CastHash::new("0xb"), &tree).unwrap();

        // The first timer fires at t=2s but must not clear the newer target.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(
            controller.state(),
            FocusState::Highlighted(CastHash::new("0xb"))
        );

        // The second timer fires at t=3s.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(controller.state(), FocusState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_after_teardown_is_ignored() {
        let controller = Arc::new(FocusController::new());
        let tree = tree_with(vec![reply("0xa")]);
        controller.focus(&CastHash::new("0xa"), &tree).unwrap();
        drop(controller);

        // The timer task upgrades a dead Weak and exits quietly.
        tokio::time::sleep(HIGHLIGHT_DURATION + Duration::from_millis(10)).await;
    }
}
