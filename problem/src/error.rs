//! Typed problem errors.
//!
//! Constraint rejection is not represented here: a rejected successor is
//! simply absent from the expansion result. A constraint that panics is a
//! configuration bug and unwinds through `successors()` uncaught.

use formwork_kernel::carrier::state_key::StateKey;
use thiserror::Error;

use crate::environment::EnvironmentError;
use crate::node::NodeId;

/// Failure of a problem operation.
///
/// Structural errors abort the current `successors()` or action-cost call and
/// are never retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    /// The operation has no implementation for this problem (for example
    /// `apply_action` on a problem with no environment attached).
    #[error("operation not implemented: {operation}")]
    NotImplemented { operation: &'static str },

    /// The transition model has no entry for this state.
    #[error("unknown state: {key}")]
    UnknownState { key: StateKey },

    /// The transition model has no entry for this action at this state.
    #[error("unknown action {action} at state {key}")]
    UnknownAction { key: StateKey, action: String },

    /// Raised by the environment collaborator; passed through unmodified.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl ProblemError {
    pub(crate) fn not_implemented(operation: &'static str) -> Self {
        Self::NotImplemented { operation }
    }
}

/// Failure of a search-tree arena operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node id that this tree never issued.
    #[error("node {id} does not exist in this tree")]
    UnknownNode { id: NodeId },

    /// A non-root node whose parent is not already in the tree.
    #[error("parent {parent} is not in this tree")]
    UnknownParent { parent: NodeId },

    /// A node built from another tree's handle.
    #[error("node was built under parent {parent} of a different tree")]
    ForeignNode { parent: NodeId },

    /// A second root.
    #[error("node has no parent; a tree has exactly one root")]
    DetachedNode,

    /// The arena has issued `u32::MAX` ids.
    #[error("search tree is full")]
    Capacity,
}
