//! User-adjustable driver options shared between a session and its drivers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// A scripted tree operation for the next play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum TreeAction {
    Insert(i64),
    Search(i64),
}

/// Visiting order of the traversal driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Left, root, right.
    #[default]
    InOrder,
    /// Root, left, right.
    PreOrder,
    /// Left, right, root.
    PostOrder,
}

impl TraversalOrder {
    pub fn name(&self) -> &'static str {
        match self {
            TraversalOrder::InOrder => "Inorder",
            TraversalOrder::PreOrder => "Preorder",
            TraversalOrder::PostOrder => "Postorder",
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    tree_actions: VecDeque<TreeAction>,
    traversal: TraversalOrder,
}

/// Cloneable handle; every clone sees the same options.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    inner: Arc<Mutex<Inner>>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an action for a later play of a BST or AVL driver.
    pub fn queue_tree_action(&self, action: TreeAction) {
        self.lock().tree_actions.push_back(action);
    }

    /// Next queued action. It stays queued until [`complete_tree_action`]
    /// so a cancelled run leaves it for the next play.
    ///
    /// [`complete_tree_action`]: Controls::complete_tree_action
    pub fn next_tree_action(&self) -> Option<TreeAction> {
        self.lock().tree_actions.front().copied()
    }

    /// Drop `action` from the front of the queue once a run has performed
    /// it. Does nothing if the queue was cleared or reordered meanwhile.
    pub fn complete_tree_action(&self, action: TreeAction) -> bool {
        let mut inner = self.lock();
        if inner.tree_actions.front() == Some(&action) {
            inner.tree_actions.pop_front();
            true
        } else {
            false
        }
    }

    pub fn pending_tree_actions(&self) -> usize {
        self.lock().tree_actions.len()
    }

    pub fn clear_tree_actions(&self) {
        self.lock().tree_actions.clear();
    }

    pub fn set_traversal_order(&self, order: TraversalOrder) {
        self.lock().traversal = order;
    }

    pub fn traversal_order(&self) -> TraversalOrder {
        self.lock().traversal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let controls = Controls::new();
        let other = controls.clone();
        controls.queue_tree_action(TreeAction::Insert(4));
        controls.queue_tree_action(TreeAction::Search(9));
        assert_eq!(other.pending_tree_actions(), 2);
        assert_eq!(other.next_tree_action(), Some(TreeAction::Insert(4)));
        assert_eq!(controls.pending_tree_actions(), 2);

        other.set_traversal_order(TraversalOrder::PostOrder);
        assert_eq!(controls.traversal_order(), TraversalOrder::PostOrder);
    }

    #[test]
    fn completing_pops_only_the_matching_front() {
        let controls = Controls::new();
        controls.queue_tree_action(TreeAction::Insert(1));
        controls.queue_tree_action(TreeAction::Insert(2));
        assert!(!controls.complete_tree_action(TreeAction::Insert(2)));
        assert!(controls.complete_tree_action(TreeAction::Insert(1)));
        assert_eq!(controls.next_tree_action(), Some(TreeAction::Insert(2)));

        controls.clear_tree_actions();
        assert!(!controls.complete_tree_action(TreeAction::Insert(2)));
        assert_eq!(controls.next_tree_action(), None);
    }

    #[test]
    fn tree_action_wire_format() {
        let action: TreeAction = serde_json::from_str(r#"{"action":"insert","value":42}"#).unwrap();
        assert_eq!(action, TreeAction::Insert(42));
    }
}
