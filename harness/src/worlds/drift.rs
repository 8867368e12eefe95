//! `Drift`: a point mass on a bounded rail.
//!
//! The continuous state is `(position, velocity)`, both in `[-1, 1]`. An
//! action is a thrust level in `-MAX_LEVEL..=MAX_LEVEL`, scaled to
//! `[-1, 1]`. Each step integrates velocity then position over `DT`; hitting
//! either end of the rail stops the mass. States are snapped to a grid of
//! `1 / GRID` so they have a discrete key, and the environment keeps its
//! phase on that same grid.
//!
//! The episode ends when the mass rests near the target. Thrust costs
//! energy, so the search space is worth sampling rather than enumerating.

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use formwork_problem::config::ProblemConfig;
use formwork_problem::environment::{Environment, EnvironmentError, StepOutcome};
use formwork_problem::error::ProblemError;
use formwork_problem::node::{Node, TransitionInfo};
use formwork_problem::sampled::{SampledDomain, SampledProblem};
use formwork_problem::tree::NodeRef;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::contract::{WorldHarness, WorldHarnessError};

/// Largest thrust level in either direction.
pub const MAX_LEVEL: i8 = 4;

/// Integration step.
pub const DT: f64 = 0.1;

/// Grid resolution per unit of position or velocity.
pub const GRID: f64 = 100.0;

const RAIL: f64 = 1.0;
const MAX_SPEED: f64 = 1.0;

/// A snapped `(position, velocity)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub position: f64,
    pub velocity: f64,
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(value: f64) -> i64 {
    (value * GRID).round() as i64
}

#[allow(clippy::cast_precision_loss)]
fn dequantize(cell: i64) -> f64 {
    cell as f64 / GRID
}

impl Phase {
    #[must_use]
    pub fn new(position: f64, velocity: f64) -> Self {
        Self {
            position: dequantize(quantize(position)),
            velocity: dequantize(quantize(velocity)),
        }
    }

    /// `(position cell, velocity cell)`.
    #[must_use]
    pub fn key(&self) -> StateKey {
        StateKey::Tuple(vec![
            StateKey::Int(quantize(self.position)),
            StateKey::Int(quantize(self.velocity)),
        ])
    }

    /// Inverse of [`Phase::key`]; `None` for keys of any other shape.
    #[must_use]
    pub fn from_key(key: &StateKey) -> Option<Self> {
        match key {
            StateKey::Tuple(parts) => match parts.as_slice() {
                [StateKey::Int(p), StateKey::Int(v)] => Some(Self {
                    position: dequantize(*p),
                    velocity: dequantize(*v),
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Thrust for a level, in `[-1, 1]`.
#[must_use]
pub fn thrust(level: i8) -> f64 {
    f64::from(level) / f64::from(MAX_LEVEL)
}

/// Rail dynamics and goal region.
#[derive(Debug, Clone, PartialEq)]
pub struct Drift {
    pub start: Phase,
    pub target: f64,
    pub tolerance: f64,
}

impl Default for Drift {
    fn default() -> Self {
        Self {
            start: Phase::new(0.0, 0.0),
            target: 0.5,
            tolerance: 0.05,
        }
    }
}

impl Drift {
    #[must_use]
    pub fn start_state(&self) -> State {
        State::initial(self.start.key())
    }

    /// Whether `phase` rests in the goal region.
    #[must_use]
    pub fn at_rest_on_target(&self, phase: Phase) -> bool {
        (phase.position - self.target).abs() <= self.tolerance && phase.velocity.abs() <= self.tolerance
    }

    /// One integration step: `(next phase, reward, terminal)`.
    #[must_use]
    pub fn advance(&self, phase: Phase, level: i8) -> (Phase, f64, bool) {
        let force = thrust(level);
        let mut velocity = (phase.velocity + force * DT).clamp(-MAX_SPEED, MAX_SPEED);
        let mut position = phase.position + velocity * DT;
        if position.abs() > RAIL {
            position = position.clamp(-RAIL, RAIL);
            velocity = 0.0;
        }
        let next = Phase::new(position, velocity);
        let terminal = self.at_rest_on_target(next);
        let reward = if terminal { 1.0 } else { -force * force * DT };
        (next, reward, terminal)
    }
}

impl SampledDomain for Drift {
    type Action = i8;

    fn sample_actions(&self, state: &State, sample_size: usize, rng: &mut StdRng) -> Vec<i8> {
        if state.is_terminal() {
            return Vec::new();
        }
        let levels: Vec<i8> = (-MAX_LEVEL..=MAX_LEVEL).collect();
        levels.choose_multiple(rng, sample_size).copied().collect()
    }

    fn successors(&self, action: &i8, parent: NodeRef<'_, i8>, step_cost: f64) -> Result<Vec<Node<i8>>, ProblemError> {
        let key = parent.state().key();
        let phase = Phase::from_key(key).ok_or_else(|| ProblemError::UnknownState { key: key.clone() })?;
        let (next, reward, terminal) = self.advance(phase, *action);
        Ok(vec![Node::child(
            parent,
            State::new(next.key(), terminal),
            *action,
            step_cost,
            TransitionInfo::new(1.0, reward),
        )])
    }

    fn action_cost(&self, action: &i8, _state: &State) -> Option<f64> {
        Some(1.0 + thrust(*action).abs())
    }
}

/// The live rail, stepping with the same dynamics as [`Drift`].
#[derive(Debug, Clone)]
pub struct DriftEnv {
    drift: Drift,
    phase: Phase,
    steps: u64,
    max_steps: u64,
}

impl DriftEnv {
    #[must_use]
    pub fn new(drift: Drift, max_steps: u64) -> Self {
        Self {
            phase: drift.start,
            drift,
            steps: 0,
            max_steps,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Environment for DriftEnv {
    type Action = i8;

    fn step(&mut self, action: &i8) -> Result<StepOutcome, EnvironmentError> {
        if action.unsigned_abs() > MAX_LEVEL.unsigned_abs() {
            return Err(EnvironmentError::new(format!("thrust level {action} out of range")));
        }
        let (next, reward, terminated) = self.drift.advance(self.phase, *action);
        self.phase = next;
        self.steps += 1;
        Ok(StepOutcome {
            observation: next.key(),
            reward,
            terminated,
            truncated: !terminated && self.steps >= self.max_steps,
        })
    }

    fn reset(&mut self) -> Result<StateKey, EnvironmentError> {
        self.phase = self.drift.start;
        self.steps = 0;
        Ok(self.phase.key())
    }
}

/// Harness world: accelerate toward the target, then brake.
#[derive(Debug, Clone)]
pub struct DriftWorld {
    pub drift: Drift,
    pub max_steps: u64,
    pub thrusts: Vec<i8>,
}

impl Default for DriftWorld {
    fn default() -> Self {
        let mut thrusts = vec![MAX_LEVEL; 5];
        thrusts.extend([-MAX_LEVEL; 5]);
        Self {
            drift: Drift::default(),
            max_steps: 200,
            thrusts,
        }
    }
}

impl WorldHarness for DriftWorld {
    type Action = i8;
    type Problem = SampledProblem<Drift>;

    #[allow(clippy::unnecessary_literal_bound)]
    fn world_id(&self) -> &str {
        "drift_rail"
    }

    fn build_problem(&self, config: ProblemConfig) -> Result<SampledProblem<Drift>, WorldHarnessError> {
        config.validate().map_err(|e| WorldHarnessError::Build {
            detail: e.to_string(),
        })?;
        let initial = self.drift.start_state();
        Ok(SampledProblem::new(self.drift.clone(), initial, config)
            .with_environment(DriftEnv::new(self.drift.clone(), self.max_steps)))
    }

    fn program(&self) -> Vec<i8> {
        self.thrusts.clone()
    }
}
