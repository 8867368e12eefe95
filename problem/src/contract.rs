//! The problem contract: capability methods plus the fixed successor pipeline.
//!
//! A problem variant supplies action enumeration, raw successor
//! construction, action costs, and goal detection. The trait supplies the
//! pipeline every search algorithm relies on:
//!
//! ```text
//! successors(node)
//!   → get_applicable_actions_at_node(node)      (variant)
//!   → get_successors(action, node) per action   (variant)
//!   → constraint filter on (successor, action)  (provided)
//!   → ordered, pruned Vec<Node>
//! ```

use std::fmt::Debug;

use formwork_kernel::carrier::state::State;
use tracing::{debug, trace};

use crate::constraint::ConstraintSet;
use crate::environment::StepOutcome;
use crate::error::ProblemError;
use crate::node::{Node, NodeId};
use crate::tree::{NodeRef, SearchTree};
use crate::valuation::{Valuation, ValueOrder};

/// A state-space problem as seen by a search algorithm.
///
/// # Contract
///
/// - Expansion is deterministic: the same node, table/sampler, and
///   constraints produce the same successors in the same order.
/// - Expansion never reads or moves the live state. Only `apply_action` and
///   `reset_env` do, and both take `&mut self`.
pub trait Problem {
    type Action: Clone + Debug;

    /// The live state: where the agent actually is.
    fn get_current_state(&self) -> &State;

    /// Ordered constraints, or `None` for an unconstrained problem.
    fn constraints(&self) -> Option<&ConstraintSet<Self::Action>>;

    /// Whether one action may yield several outcomes.
    fn is_stochastic(&self) -> bool;

    /// Direction used by [`Problem::is_better_or_equal`].
    fn value_order(&self) -> ValueOrder {
        ValueOrder::HigherIsBetter
    }

    /// Actions applicable at `state`, in enumeration order.
    ///
    /// # Errors
    ///
    /// Variant-specific; table problems report [`ProblemError::UnknownState`].
    fn get_applicable_actions_at_state(&self, state: &State) -> Result<Vec<Self::Action>, ProblemError>;

    /// Actions applicable at `node`. Defaults to the node's state.
    ///
    /// # Errors
    ///
    /// As [`Problem::get_applicable_actions_at_state`].
    fn get_applicable_actions_at_node(
        &self,
        node: NodeRef<'_, Self::Action>,
    ) -> Result<Vec<Self::Action>, ProblemError> {
        self.get_applicable_actions_at_state(node.state())
    }

    /// Raw (unfiltered) successors of `node` under `action`: one node per
    /// outcome, in transition order.
    ///
    /// # Errors
    ///
    /// Variant-specific lookup failures.
    fn get_successors(
        &self,
        action: &Self::Action,
        node: NodeRef<'_, Self::Action>,
    ) -> Result<Vec<Node<Self::Action>>, ProblemError>;

    /// Cost of applying `action` at `state`.
    ///
    /// # Errors
    ///
    /// Variant-specific.
    fn get_action_cost(&self, action: &Self::Action, state: &State) -> Result<f64, ProblemError>;

    fn is_goal_state(&self, state: &State) -> bool;

    /// Step the environment; moves the live state.
    ///
    /// # Errors
    ///
    /// [`ProblemError::NotImplemented`] unless the variant provides it.
    fn apply_action(&mut self, _action: &Self::Action) -> Result<StepOutcome, ProblemError> {
        Err(ProblemError::not_implemented("apply_action"))
    }

    /// Reset the environment; moves the live state to the initial state.
    ///
    /// # Errors
    ///
    /// [`ProblemError::NotImplemented`] unless the variant provides it.
    fn reset_env(&mut self) -> Result<State, ProblemError> {
        Err(ProblemError::not_implemented("reset_env"))
    }

    /// `true` iff constraints are absent or every constraint accepts `state`.
    fn is_valid(&self, state: &State) -> bool {
        match self.constraints() {
            None => {
                trace!(%state, "no constraints; state admitted");
                true
            }
            Some(set) => set.admits_state(state),
        }
    }

    /// Every successor of `node` before constraint filtering.
    ///
    /// Returns `Ok(None)` when no action is applicable.
    ///
    /// # Errors
    ///
    /// Propagates enumeration and construction failures.
    fn raw_successors(
        &self,
        node: NodeRef<'_, Self::Action>,
    ) -> Result<Option<Vec<Node<Self::Action>>>, ProblemError> {
        let actions = self.get_applicable_actions_at_node(node)?;
        if actions.is_empty() {
            return Ok(None);
        }
        let mut raw = Vec::new();
        for action in &actions {
            raw.extend(self.get_successors(action, node)?);
        }
        Ok(Some(raw))
    }

    /// Constraint-filtered successors of `node`.
    ///
    /// Returns `Ok(None)` when no action is applicable (a dead end or
    /// terminal state). Otherwise returns the successors every constraint
    /// accepts as `(successor_state, action)`, ordered by action enumeration
    /// order and then transition order. With no constraints, every raw
    /// successor is kept.
    ///
    /// # Errors
    ///
    /// Propagates enumeration and construction failures without recovery.
    fn successors(
        &self,
        node: NodeRef<'_, Self::Action>,
    ) -> Result<Option<Vec<Node<Self::Action>>>, ProblemError> {
        let actions = self.get_applicable_actions_at_node(node)?;
        if actions.is_empty() {
            debug!(node = %node.id(), state = %node.state(), "no applicable actions");
            return Ok(None);
        }

        let constraints = self.constraints();
        let mut kept = Vec::new();
        let mut raw_count = 0usize;
        for action in &actions {
            for successor in self.get_successors(action, node)? {
                raw_count += 1;
                let violation = constraints
                    .and_then(|set| set.first_transition_violation(successor.state(), action));
                match violation {
                    Some(constraint) => trace!(
                        state = %successor.state(),
                        ?action,
                        constraint = constraint.name(),
                        "successor rejected"
                    ),
                    None => kept.push(successor),
                }
            }
        }

        debug!(
            node = %node.id(),
            state = %node.state(),
            actions = actions.len(),
            raw = raw_count,
            kept = kept.len(),
            "expanded"
        );
        Ok(Some(kept))
    }

    /// Score of node `id` in `tree`.
    ///
    /// [`Valuation::PathCost`] recomputes the action-cost sum along the path
    /// from the root; [`Valuation::PathValue`] sums transition rewards.
    ///
    /// # Errors
    ///
    /// Tree lookup and action-cost failures.
    fn evaluate(
        &self,
        tree: &SearchTree<Self::Action>,
        id: NodeId,
        valuation: Valuation,
    ) -> Result<f64, ProblemError> {
        match valuation {
            Valuation::PathCost => tree.path_cost_to_root(id, self),
            Valuation::PathValue => Ok(tree.path_value_to_root(id)?),
        }
    }

    /// `true` iff `val_a` is at least as good as `val_b` under
    /// [`Problem::value_order`].
    fn is_better_or_equal(&self, val_a: f64, val_b: f64) -> bool {
        self.value_order().is_better_or_equal(val_a, val_b)
    }
}
