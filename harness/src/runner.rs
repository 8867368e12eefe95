//! Harness runner: drives a problem's live cursor through a fixed program.
//!
//! The runner uses ONLY the problem contract: `reset_env`, `apply_action`,
//! `get_current_state`, and (for conformance) `get_successors`. It never
//! reaches into the environment directly.
//!
//! # Pipeline
//!
//! ```text
//! build_problem() → reset_env() → [apply_action() × N] → RolloutTranscript
//!   → check_table_conformance() (optional)
//! ```

use std::fmt::Debug;

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use formwork_problem::config::ProblemConfig;
use formwork_problem::contract::Problem;
use formwork_problem::error::ProblemError;
use formwork_problem::tree::SearchTree;
use thiserror::Error;
use tracing::{debug, info};

use crate::contract::{WorldHarness, WorldHarnessError};
use crate::transcript::{RolloutStep, RolloutTranscript};

/// Error during a harness run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error(transparent)]
    World(#[from] WorldHarnessError),

    /// `reset_env` failed before any action was applied.
    #[error("reset: {source}")]
    Reset {
        #[source]
        source: ProblemError,
    },

    /// `apply_action` failed on the `step`-th action (zero-based).
    #[error("step {step}: {source}")]
    Step {
        step: usize,
        #[source]
        source: ProblemError,
    },
}

/// An observed transition the problem's model does not predict.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConformanceError {
    #[error("step {step}: {from} --{action}--> {observation} (reward {reward}, terminated {terminated}) is not a predicted successor")]
    Unpredicted {
        step: usize,
        from: StateKey,
        action: String,
        observation: StateKey,
        reward: f64,
        terminated: bool,
    },

    #[error(transparent)]
    Problem(#[from] ProblemError),
}

/// Reset `problem` and apply `program` in order.
///
/// Stops early once an outcome reports `terminated` or `truncated`;
/// remaining actions are not applied.
///
/// # Errors
///
/// [`RunError::Reset`] if the problem cannot be reset (for example, it has
/// no environment attached); [`RunError::Step`] if an action fails. Steps
/// before the failure are lost.
pub fn run_program<P>(world_id: &str, problem: &mut P, program: &[P::Action]) -> Result<RolloutTranscript<P::Action>, RunError>
where
    P: Problem,
{
    let initial = problem
        .reset_env()
        .map_err(|source| RunError::Reset { source })?;
    info!(world_id, initial = %initial.key(), program_len = program.len(), "rollout start");
    let mut transcript = RolloutTranscript::new(world_id, initial.key().clone());

    for (step, action) in program.iter().enumerate() {
        let from = problem.get_current_state().key().clone();
        let outcome = problem
            .apply_action(action)
            .map_err(|source| RunError::Step { step, source })?;
        let done = outcome.terminated || outcome.truncated;
        transcript.steps.push(RolloutStep {
            from,
            action: action.clone(),
            outcome,
        });
        if done {
            debug!(world_id, step, "episode ended before program end");
            break;
        }
    }

    info!(
        world_id,
        steps = transcript.steps.len(),
        program_len = program.len(),
        total_reward = transcript.total_reward(),
        finished = transcript.finished(),
        "rollout complete"
    );
    Ok(transcript)
}

/// Build a world's problem and run its program.
///
/// # Errors
///
/// [`RunError::World`] if the problem cannot be built, otherwise as
/// [`run_program`].
pub fn run_world<W: WorldHarness>(world: &W, config: ProblemConfig) -> Result<RolloutTranscript<W::Action>, RunError> {
    let mut problem = world.build_problem(config)?;
    run_program(world.world_id(), &mut problem, &world.program())
}

/// Check that every transition in `transcript` is one of the successors
/// `problem` predicts for the same state and action.
///
/// Matching compares next state key, terminal flag, and reward (when the
/// successor carries one). Constraints are not applied: the environment
/// does not know about them.
///
/// # Errors
///
/// [`ConformanceError::Unpredicted`] for the first unmatched step;
/// [`ConformanceError::Problem`] if the problem cannot expand a visited
/// state.
pub fn check_table_conformance<P>(problem: &P, transcript: &RolloutTranscript<P::Action>) -> Result<(), ConformanceError>
where
    P: Problem,
    P::Action: Debug,
{
    for (step, record) in transcript.steps.iter().enumerate() {
        let tree: SearchTree<P::Action> = SearchTree::new(State::initial(record.from.clone()));
        let root = tree.node(tree.root()).map_err(ProblemError::from)?;
        let predicted = problem.get_successors(&record.action, root)?;
        let outcome = &record.outcome;
        let matched = predicted.iter().any(|node| {
            node.state().key() == &outcome.observation
                && node.state().is_terminal() == outcome.terminated
                && node.info().reward.is_none_or(|r| r.total_cmp(&outcome.reward).is_eq())
        });
        if !matched {
            return Err(ConformanceError::Unpredicted {
                step,
                from: record.from.clone(),
                action: format!("{:?}", record.action),
                observation: outcome.observation.clone(),
                reward: outcome.reward,
                terminated: outcome.terminated,
            });
        }
    }
    debug!(steps = transcript.steps.len(), "transcript conforms to model");
    Ok(())
}
