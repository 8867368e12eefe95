//! Append-only node arena.
//!
//! The tree owns every node. Parent links are [`NodeId`]s issued by the same
//! tree, and `insert` only accepts a node built from one of this tree's
//! handles whose parent is already present, so every edge points from a
//! newer node to a strictly older one and the structure is acyclic by
//! construction.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use formwork_kernel::carrier::state::State;

use crate::contract::Problem;
use crate::error::{ProblemError, TreeError};
use crate::node::{Node, NodeId};

static NEXT_TREE: AtomicU64 = AtomicU64::new(0);

/// Identity of one [`SearchTree`]; every node records the tree it was built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TreeTag(u64);

impl TreeTag {
    fn fresh() -> Self {
        Self(NEXT_TREE.fetch_add(1, Ordering::Relaxed))
    }
}

/// A node together with its id in the owning tree.
///
/// This is the handle successor construction receives: it is what lets a
/// child record its parent.
pub struct NodeRef<'a, A> {
    id: NodeId,
    node: &'a Node<A>,
}

impl<A> Clone for NodeRef<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for NodeRef<'_, A> {}

impl<'a, A> NodeRef<'a, A> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn node(&self) -> &'a Node<A> {
        self.node
    }

    pub(crate) fn tree(&self) -> TreeTag {
        self.node.tree()
    }
}

impl<A> Deref for NodeRef<'_, A> {
    type Target = Node<A>;

    fn deref(&self) -> &Self::Target {
        self.node
    }
}

impl<A: std::fmt::Debug> std::fmt::Debug for NodeRef<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("node", self.node)
            .finish()
    }
}

/// Search tree rooted at the initial node.
///
/// A clone is a separate tree: nodes built from the clone's handles are
/// rejected by the original and vice versa.
#[derive(Debug)]
pub struct SearchTree<A> {
    tag: TreeTag,
    nodes: Vec<Node<A>>,
}

impl<A: Clone> Clone for SearchTree<A> {
    fn clone(&self) -> Self {
        let tag = TreeTag::fresh();
        let nodes = self
            .nodes
            .iter()
            .map(|node| node.clone().retagged(tag))
            .collect();
        Self { tag, nodes }
    }
}

impl<A> SearchTree<A> {
    /// Create a tree holding only the root node for `root_state`.
    #[must_use]
    pub fn new(root_state: State) -> Self {
        let tag = TreeTag::fresh();
        Self {
            tag,
            nodes: vec![Node::root(tag, root_state)],
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node<A>> {
        self.nodes.get(id.index())
    }

    /// Handle for `id`, for passing to successor expansion.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if this tree never issued `id`.
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_, A>, TreeError> {
        self.get(id)
            .map(|node| NodeRef { id, node })
            .ok_or(TreeError::UnknownNode { id })
    }

    /// Append a node produced by successor expansion.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DetachedNode`] if the node has no parent.
    /// - [`TreeError::UnknownParent`] if the parent is not in this tree.
    /// - [`TreeError::ForeignNode`] if the node was built from another
    ///   tree's handle.
    /// - [`TreeError::Capacity`] if the id space is exhausted.
    pub fn insert(&mut self, node: Node<A>) -> Result<NodeId, TreeError> {
        let parent = node.parent().ok_or(TreeError::DetachedNode)?;
        if parent.index() >= self.nodes.len() {
            return Err(TreeError::UnknownParent { parent });
        }
        if node.tree() != self.tag {
            return Err(TreeError::ForeignNode { parent });
        }
        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| TreeError::Capacity)?);
        self.nodes.push(node);
        Ok(id)
    }

    /// Append every node, returning their ids in order.
    ///
    /// # Errors
    ///
    /// Stops at the first node [`SearchTree::insert`] rejects.
    pub fn extend(&mut self, nodes: impl IntoIterator<Item = Node<A>>) -> Result<Vec<NodeId>, TreeError> {
        nodes.into_iter().map(|node| self.insert(node)).collect()
    }

    /// Node ids from the root down to `id` (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `id` is not in this tree.
    pub fn path(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get(current).ok_or(TreeError::UnknownNode { id: current })?;
            path.push(current);
            cursor = node.parent();
        }
        path.reverse();
        Ok(path)
    }

    /// Recompute the accumulated path cost of `id` by walking to the root and
    /// summing `problem.get_action_cost(action, parent_state)` per edge.
    ///
    /// Summation runs root-first, in the same order successor construction
    /// accumulates, so the result equals the stored `path_cost` exactly when
    /// the problem's costs are unchanged.
    ///
    /// # Errors
    ///
    /// Propagates tree lookups and action-cost failures.
    pub fn path_cost_to_root<P>(&self, id: NodeId, problem: &P) -> Result<f64, ProblemError>
    where
        P: Problem<Action = A> + ?Sized,
    {
        let mut total = 0.0;
        for pair in self.path(id)?.windows(2) {
            let parent = self.get(pair[0]).ok_or(TreeError::UnknownNode { id: pair[0] })?;
            let child = self.get(pair[1]).ok_or(TreeError::UnknownNode { id: pair[1] })?;
            if let Some(action) = child.action() {
                total += problem.get_action_cost(action, parent.state())?;
            }
        }
        Ok(total)
    }

    /// Sum of transition rewards from the root down to `id`.
    ///
    /// Edges without a reward contribute zero.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `id` is not in this tree.
    pub fn path_value_to_root(&self, id: NodeId) -> Result<f64, TreeError> {
        let mut total = 0.0;
        for step in self.path(id)? {
            let node = self.get(step).ok_or(TreeError::UnknownNode { id: step })?;
            total += node.info().reward.unwrap_or(0.0);
        }
        Ok(total)
    }

    /// Iterate all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_, A>> {
        self.nodes.iter().enumerate().map(|(i, node)| NodeRef {
            // `insert` guarantees every index fits in u32.
            id: NodeId(u32::try_from(i).unwrap_or(u32::MAX)),
            node,
        })
    }
}
