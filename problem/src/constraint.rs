//! Constraint collaborators.
//!
//! A constraint is a pure predicate over a candidate state, optionally
//! together with the action that produced it. Constraints are evaluated in
//! set order and the first rejection short-circuits.

use std::collections::BTreeSet;
use std::fmt;

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;

/// A validity check over states and transitions.
///
/// Implementations must be side-effect free and total. A panic inside a
/// constraint is not caught by the problem layer.
pub trait Constraint<A>: Send + Sync {
    /// Short label used in trace output.
    fn name(&self) -> &str;

    /// Whether `state` is admissible on its own.
    fn is_valid_state(&self, state: &State) -> bool;

    /// Whether reaching `state` via `action` is admissible.
    ///
    /// Defaults to the state-only check.
    fn is_valid_transition(&self, state: &State, _action: &A) -> bool {
        self.is_valid_state(state)
    }
}

/// Ordered collection of constraints.
pub struct ConstraintSet<A> {
    constraints: Vec<Box<dyn Constraint<A>>>,
}

impl<A> ConstraintSet<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Builder-style append.
    #[must_use]
    pub fn with(mut self, constraint: impl Constraint<A> + 'static) -> Self {
        self.push(constraint);
        self
    }

    pub fn push(&mut self, constraint: impl Constraint<A> + 'static) {
        self.constraints.push(Box::new(constraint));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// First constraint rejecting `state`, if any.
    #[must_use]
    pub fn first_state_violation(&self, state: &State) -> Option<&dyn Constraint<A>> {
        self.constraints
            .iter()
            .map(Box::as_ref)
            .find(|c| !c.is_valid_state(state))
    }

    /// First constraint rejecting `(state, action)`, if any.
    #[must_use]
    pub fn first_transition_violation(&self, state: &State, action: &A) -> Option<&dyn Constraint<A>> {
        self.constraints
            .iter()
            .map(Box::as_ref)
            .find(|c| !c.is_valid_transition(state, action))
    }

    #[must_use]
    pub fn admits_state(&self, state: &State) -> bool {
        self.first_state_violation(state).is_none()
    }

    #[must_use]
    pub fn admits_transition(&self, state: &State, action: &A) -> bool {
        self.first_transition_violation(state, action).is_none()
    }
}

impl<A> Default for ConstraintSet<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for ConstraintSet<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.constraints.iter().map(|c| c.name()))
            .finish()
    }
}

/// Rejects a fixed set of state keys.
#[derive(Debug, Clone)]
pub struct ForbiddenStates {
    keys: BTreeSet<StateKey>,
}

impl ForbiddenStates {
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = impl Into<StateKey>>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl<A> Constraint<A> for ForbiddenStates {
    fn name(&self) -> &str {
        "forbidden_states"
    }

    fn is_valid_state(&self, state: &State) -> bool {
        !self.keys.contains(state.key())
    }
}

/// Rejects terminal states (useful when terminal outcomes are failures).
#[derive(Debug, Clone, Copy, Default)]
pub struct NonTerminal;

impl<A> Constraint<A> for NonTerminal {
    fn name(&self) -> &str {
        "non_terminal"
    }

    fn is_valid_state(&self, state: &State) -> bool {
        !state.is_terminal()
    }
}

/// Closure-backed state constraint.
pub struct StatePredicate<F> {
    name: String,
    check: F,
}

impl<F> StatePredicate<F>
where
    F: Fn(&State) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<A, F> Constraint<A> for StatePredicate<F>
where
    F: Fn(&State) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid_state(&self, state: &State) -> bool {
        (self.check)(state)
    }
}

/// Closure-backed transition constraint.
///
/// The state-only check admits everything; only transitions are judged.
pub struct TransitionPredicate<F> {
    name: String,
    check: F,
}

impl<F> TransitionPredicate<F> {
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<A, F> Constraint<A> for TransitionPredicate<F>
where
    F: Fn(&State, &A) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid_state(&self, _state: &State) -> bool {
        true
    }

    fn is_valid_transition(&self, state: &State, action: &A) -> bool {
        (self.check)(state, action)
    }
}
