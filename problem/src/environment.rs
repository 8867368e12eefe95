//! Environment collaborator contract and the live cursor.
//!
//! The environment is the only thing that moves the live state. Search never
//! touches it: nodes in a [`crate::SearchTree`] are hypothetical, the
//! [`LiveCursor`] is real.

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::ProblemError;
use crate::table::ProbabilityTable;

/// Error surfaced by an environment's `step` or `reset`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("environment failure: {detail}")]
pub struct EnvironmentError {
    pub detail: String,
}

impl EnvironmentError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: StateKey,
    pub reward: f64,
    /// The episode reached a terminal state.
    pub terminated: bool,
    /// The episode was cut short (time limit) without reaching a terminal state.
    pub truncated: bool,
}

/// A simulated (or real) environment with step/reset primitives.
pub trait Environment: Send + Sync {
    type Action;

    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying environment.
    fn step(&mut self, action: &Self::Action) -> Result<StepOutcome, EnvironmentError>;

    /// Restart the episode and return the initial observation.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying environment.
    fn reset(&mut self) -> Result<StateKey, EnvironmentError>;
}

/// An environment whose full transition model is available in closed form.
pub trait TabularEnvironment: Environment {
    fn probability_table(&self) -> ProbabilityTable<Self::Action>;
}

/// The live `current_state` of a problem plus the environment that moves it.
///
/// Only [`LiveCursor::apply`] and [`LiveCursor::reset`] change the state,
/// and both take `&mut self`.
pub struct LiveCursor<A> {
    state: State,
    environment: Option<Box<dyn Environment<Action = A>>>,
    steps: u64,
}

impl<A> LiveCursor<A> {
    /// A cursor with no environment attached.
    #[must_use]
    pub fn detached(initial: State) -> Self {
        Self {
            state: initial,
            environment: None,
            steps: 0,
        }
    }

    pub fn attached(initial: State, environment: impl Environment<Action = A> + 'static) -> Self {
        Self {
            state: initial,
            environment: Some(Box::new(environment)),
            steps: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Steps applied since the last reset.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.environment.is_some()
    }

    /// Step the environment and move the cursor to the observed state.
    ///
    /// # Errors
    ///
    /// [`ProblemError::NotImplemented`] when detached; environment failures
    /// pass through unmodified and leave the cursor where it was.
    pub fn apply(&mut self, action: &A) -> Result<StepOutcome, ProblemError> {
        let env = self
            .environment
            .as_mut()
            .ok_or_else(|| ProblemError::not_implemented("apply_action"))?;
        let outcome = env.step(action)?;
        self.state = State::new(outcome.observation.clone(), outcome.terminated);
        self.steps += 1;
        debug!(
            state = %self.state,
            reward = outcome.reward,
            steps = self.steps,
            "live cursor advanced"
        );
        Ok(outcome)
    }

    /// Reset the environment and move the cursor to the initial observation.
    ///
    /// # Errors
    ///
    /// Same as [`LiveCursor::apply`].
    pub fn reset(&mut self) -> Result<&State, ProblemError> {
        let env = self
            .environment
            .as_mut()
            .ok_or_else(|| ProblemError::not_implemented("reset_env"))?;
        let key = env.reset()?;
        self.state = State::initial(key);
        self.steps = 0;
        debug!(state = %self.state, "live cursor reset");
        Ok(&self.state)
    }
}

impl<A> std::fmt::Debug for LiveCursor<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveCursor")
            .field("state", &self.state)
            .field("attached", &self.is_attached())
            .field("steps", &self.steps)
            .finish()
    }
}
