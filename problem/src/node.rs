//! Core search node types.

use std::fmt;

use formwork_kernel::carrier::state::State;
use serde::{Deserialize, Serialize};

use crate::tree::{NodeRef, TreeTag};

/// Index of a node in its [`crate::SearchTree`].
///
/// Ids are issued in creation order, so a parent id is always strictly
/// smaller than the ids of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side-channel data carried by a transition.
///
/// Stochastic outcomes are sibling nodes under the same action, each carrying
/// its own `probability`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub probability: Option<f64>,
    pub reward: Option<f64>,
}

impl TransitionInfo {
    #[must_use]
    pub fn new(probability: f64, reward: f64) -> Self {
        Self {
            probability: Some(probability),
            reward: Some(reward),
        }
    }

    /// Only a reward (deterministic transitions).
    #[must_use]
    pub fn reward(reward: f64) -> Self {
        Self {
            probability: None,
            reward: Some(reward),
        }
    }
}

/// An immutable node in the hypothetical search tree.
///
/// A node is built once, by successor construction, and never mutated. The
/// parent link is an index into the owning arena, never an ownership edge.
///
/// Invariant: the root has `path_cost == 0.0`, no parent and no action; any
/// other node has `path_cost == parent.path_cost + action_cost(action,
/// parent.state)`.
///
/// Equality compares content only, not the tree the node was built in.
#[derive(Debug, Clone)]
pub struct Node<A> {
    tree: TreeTag,
    state: State,
    parent: Option<NodeId>,
    action: Option<A>,
    path_cost: f64,
    depth: u32,
    info: TransitionInfo,
}

impl<A> Node<A> {
    pub(crate) fn root(tree: TreeTag, state: State) -> Self {
        Self {
            tree,
            state,
            parent: None,
            action: None,
            path_cost: 0.0,
            depth: 0,
            info: TransitionInfo::default(),
        }
    }

    /// Build the successor of `parent` reached by `action`.
    ///
    /// `step_cost` is the action cost evaluated at the parent's state; the
    /// child's path cost is accumulated here and nowhere else.
    #[must_use]
    pub fn child(
        parent: NodeRef<'_, A>,
        state: State,
        action: A,
        step_cost: f64,
        info: TransitionInfo,
    ) -> Self {
        Self {
            tree: parent.tree(),
            state,
            parent: Some(parent.id()),
            action: Some(action),
            path_cost: parent.path_cost() + step_cost,
            depth: parent.depth().saturating_add(1),
            info,
        }
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Parent id (`None` for the root).
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The action applied to the parent (`None` for the root).
    #[must_use]
    pub fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    #[must_use]
    pub fn path_cost(&self) -> f64 {
        self.path_cost
    }

    /// Tree depth (root = 0).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn info(&self) -> &TransitionInfo {
        &self.info
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn tree(&self) -> TreeTag {
        self.tree
    }

    pub(crate) fn retagged(self, tree: TreeTag) -> Self {
        Self { tree, ..self }
    }
}

impl<A: PartialEq> PartialEq for Node<A> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.parent == other.parent
            && self.action == other.action
            && self.path_cost == other.path_cost
            && self.depth == other.depth
            && self.info == other.info
    }
}
