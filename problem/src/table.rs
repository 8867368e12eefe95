//! Table-driven problems: transitions known in closed form.
//!
//! A [`ProbabilityTable`] maps state key → action → ordered outcome list.
//! Each outcome becomes exactly one successor node; stochastic actions show
//! up as several sibling nodes under the same action, each carrying its own
//! probability.

use std::collections::BTreeMap;
use std::fmt::Debug;

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, ProblemConfig};
use crate::constraint::ConstraintSet;
use crate::contract::Problem;
use crate::environment::{LiveCursor, StepOutcome, TabularEnvironment};
use crate::error::ProblemError;
use crate::node::{Node, TransitionInfo};
use crate::tree::NodeRef;
use crate::valuation::ValueOrder;

/// One outcome of an action: `(probability, next_state, reward, terminal)`.
///
/// Serialises as that 4-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, StateKey, f64, bool)", into = "(f64, StateKey, f64, bool)")]
pub struct Transition {
    pub probability: f64,
    pub next_state: StateKey,
    pub reward: f64,
    pub terminal: bool,
}

impl Transition {
    pub fn new(probability: f64, next_state: impl Into<StateKey>, reward: f64, terminal: bool) -> Self {
        Self {
            probability,
            next_state: next_state.into(),
            reward,
            terminal,
        }
    }
}

impl From<(f64, StateKey, f64, bool)> for Transition {
    fn from((probability, next_state, reward, terminal): (f64, StateKey, f64, bool)) -> Self {
        Self {
            probability,
            next_state,
            reward,
            terminal,
        }
    }
}

impl From<Transition> for (f64, StateKey, f64, bool) {
    fn from(t: Transition) -> Self {
        (t.probability, t.next_state, t.reward, t.terminal)
    }
}

/// State key → action → ordered transitions.
///
/// Actions enumerate in their `Ord` order, so enumeration is deterministic
/// regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable<A> {
    entries: BTreeMap<StateKey, BTreeMap<A, Vec<Transition>>>,
}

impl<A: Ord> ProbabilityTable<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register the outcomes of `action` at `state`, replacing any previous
    /// entry.
    pub fn insert(&mut self, state: impl Into<StateKey>, action: A, transitions: Vec<Transition>) {
        self.entries
            .entry(state.into())
            .or_default()
            .insert(action, transitions);
    }

    /// Builder-style [`ProbabilityTable::insert`].
    #[must_use]
    pub fn with(mut self, state: impl Into<StateKey>, action: A, transitions: Vec<Transition>) -> Self {
        self.insert(state, action, transitions);
        self
    }

    /// Actions registered at `key`, or `None` if the state is unknown.
    #[must_use]
    pub fn actions(&self, key: &StateKey) -> Option<&BTreeMap<A, Vec<Transition>>> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_state(&self, key: &StateKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of states with entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` if any action has more than one outcome.
    #[must_use]
    pub fn has_branching(&self) -> bool {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .any(|outcomes| outcomes.len() > 1)
    }

    /// Iterate `(state, action, outcomes)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &A, &[Transition])> {
        self.entries.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(action, outcomes)| (state, action, outcomes.as_slice()))
        })
    }
}

impl<A: Ord + DeserializeOwned> ProbabilityTable<A> {
    /// Parse a table from JSON of the form
    /// `{"s0": {"right": [[1.0, "s1", -1, false]]}}`.
    ///
    /// Outer keys and string-valued next states go through one rule, so every
    /// successor a loaded table produces can be looked up again: a string
    /// that is the compact JSON text of a state key is that key (`"3"` →
    /// `Int(3)`, `"[0,1]"` → `Tuple`, `"\"3\""` → `Text("3")`); any other
    /// string is `Text`. Next states written as JSON numbers or arrays keep
    /// their JSON type. Action keys deserialize into `A` directly, which
    /// accepts integer actions written as `"0"`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`] on malformed input.
    /// - [`ConfigError::Invalid`] for a key that parses as JSON but is not in
    ///   compact form (`"-0"`, `"[0, 1]"`), since it would not survive a
    ///   round trip. Strings that are not JSON at all, such as `"007"`, stay
    ///   `Text`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, BTreeMap<A, Vec<Transition>>> = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();
        for (key, mut actions) in raw {
            for transition in actions.values_mut().flatten() {
                if let StateKey::Text(text) = &transition.next_state {
                    transition.next_state = parse_state_key(text)?;
                }
            }
            entries.insert(parse_state_key(&key)?, actions);
        }
        Ok(Self { entries })
    }
}

fn parse_state_key(text: &str) -> Result<StateKey, ConfigError> {
    let Ok(key) = serde_json::from_str::<StateKey>(text) else {
        return Ok(StateKey::Text(text.to_string()));
    };
    if serde_json::to_string(&key)? != text {
        return Err(ConfigError::Invalid {
            detail: format!("state key {text:?} is not in compact JSON form"),
        });
    }
    Ok(key)
}

impl<A: Ord> Default for ProbabilityTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// A problem whose transition model is an explicit [`ProbabilityTable`].
pub struct TableProblem<A> {
    table: ProbabilityTable<A>,
    config: ProblemConfig,
    action_costs: Option<BTreeMap<A, f64>>,
    constraints: Option<ConstraintSet<A>>,
    cursor: LiveCursor<A>,
}

impl<A> TableProblem<A>
where
    A: Clone + Ord + Debug,
{
    /// A detached problem: expansion works, `apply_action`/`reset_env`
    /// report `NotImplemented`.
    #[must_use]
    pub fn new(initial: State, table: ProbabilityTable<A>, config: ProblemConfig) -> Self {
        Self {
            table,
            config,
            action_costs: None,
            constraints: None,
            cursor: LiveCursor::detached(initial),
        }
    }

    /// A problem backed by an environment that exposes its own table.
    pub fn from_environment<E>(environment: E, initial: State, config: ProblemConfig) -> Self
    where
        E: TabularEnvironment<Action = A> + 'static,
    {
        let table = environment.probability_table();
        debug!(
            states = table.len(),
            branching = table.has_branching(),
            "table problem built from environment"
        );
        Self {
            table,
            config,
            action_costs: None,
            constraints: None,
            cursor: LiveCursor::attached(initial, environment),
        }
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: ConstraintSet<A>) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Per-action cost overrides; actions not listed use the default cost.
    #[must_use]
    pub fn with_action_costs(mut self, costs: BTreeMap<A, f64>) -> Self {
        self.action_costs = Some(costs);
        self
    }

    #[must_use]
    pub fn table(&self) -> &ProbabilityTable<A> {
        &self.table
    }

    #[must_use]
    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    fn actions_at(&self, key: &StateKey) -> Result<&BTreeMap<A, Vec<Transition>>, ProblemError> {
        self.table
            .actions(key)
            .ok_or_else(|| ProblemError::UnknownState { key: key.clone() })
    }
}

impl<A> Problem for TableProblem<A>
where
    A: Clone + Ord + Debug,
{
    type Action = A;

    fn get_current_state(&self) -> &State {
        self.cursor.state()
    }

    fn constraints(&self) -> Option<&ConstraintSet<A>> {
        self.constraints.as_ref()
    }

    fn is_stochastic(&self) -> bool {
        self.config.stochastic
    }

    fn value_order(&self) -> ValueOrder {
        self.config.value_order
    }

    fn get_applicable_actions_at_state(&self, state: &State) -> Result<Vec<A>, ProblemError> {
        Ok(self.actions_at(state.key())?.keys().cloned().collect())
    }

    fn get_successors(&self, action: &A, node: NodeRef<'_, A>) -> Result<Vec<Node<A>>, ProblemError> {
        let key = node.state().key();
        let outcomes = self
            .actions_at(key)?
            .get(action)
            .ok_or_else(|| ProblemError::UnknownAction {
                key: key.clone(),
                action: format!("{action:?}"),
            })?;
        let step_cost = self.get_action_cost(action, node.state())?;
        Ok(outcomes
            .iter()
            .map(|t| {
                Node::child(
                    node,
                    State::new(t.next_state.clone(), t.terminal),
                    action.clone(),
                    step_cost,
                    TransitionInfo::new(t.probability, t.reward),
                )
            })
            .collect())
    }

    fn get_action_cost(&self, action: &A, _state: &State) -> Result<f64, ProblemError> {
        let cost = self
            .action_costs
            .as_ref()
            .and_then(|costs| costs.get(action))
            .copied()
            .unwrap_or(self.config.default_action_cost);
        Ok(cost)
    }

    fn is_goal_state(&self, state: &State) -> bool {
        state.is_terminal()
    }

    fn apply_action(&mut self, action: &A) -> Result<StepOutcome, ProblemError> {
        self.cursor.apply(action)
    }

    fn reset_env(&mut self) -> Result<State, ProblemError> {
        self.cursor.reset().cloned()
    }
}

impl<A: Debug> Debug for TableProblem<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableProblem")
            .field("states", &self.table.entries.len())
            .field("config", &self.config)
            .field("action_costs", &self.action_costs)
            .field("constraints", &self.constraints)
            .field("cursor", &self.cursor)
            .finish()
    }
}
